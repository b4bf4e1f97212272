use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StoreError};
use crate::kind::ColumnKind;

/// A declared column: name plus numeric kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Parses `name:kind`, e.g. `price:float64` or `timestamp:q`.
impl FromStr for Column {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, kind) = s
            .split_once(':')
            .ok_or_else(|| StoreError::Schema(format!("expected name:kind, got '{s}'")))?;
        Ok(Column::new(name.trim(), kind.trim().parse()?))
    }
}

/// Position of one column inside a binary record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: String,
    pub kind: ColumnKind,
    /// Byte offset of the field from the start of the record.
    pub offset: usize,
    /// Byte width of the field (`kind.width()`).
    pub width: usize,
}

/// An ordered set of uniquely named, fixed-width numeric columns and the
/// record layout derived from it.
///
/// Offsets and the record width are computed once in [`Schema::new`]; the
/// encoder and decoder only ever index into this table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub(crate) fields: Vec<FieldLayout>,
    pub(crate) record_width: usize,
}

impl Schema {
    /// Declares a schema.
    ///
    /// # Errors
    ///
    /// `StoreError::Schema` when `columns` is empty, a name is empty, or a
    /// name appears twice.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if columns.is_empty() {
            return Err(StoreError::Schema("schema needs at least one column".into()));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        let mut fields = Vec::with_capacity(columns.len());
        let mut offset = 0usize;

        for col in columns {
            if col.name.is_empty() {
                return Err(StoreError::Schema("column name must not be empty".into()));
            }
            if !seen.insert(col.name.clone()) {
                return Err(StoreError::Schema(format!("duplicate column name '{}'", col.name)));
            }
            let width = col.kind.width();
            fields.push(FieldLayout {
                name: col.name,
                kind: col.kind,
                offset,
                width,
            });
            offset += width;
        }

        Ok(Self {
            fields,
            record_width: offset,
        })
    }

    /// Parses a comma- or whitespace-separated list of `name:kind` pairs.
    pub fn parse(text: &str) -> Result<Self> {
        let columns = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Column>>>()?;
        Self::new(columns)
    }

    /// Size in bytes of one encoded row.
    #[must_use]
    pub fn record_width(&self) -> usize {
        self.record_width
    }

    #[must_use]
    pub fn field_layout(&self) -> &[FieldLayout] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Struct-format string of the record, e.g. `"qd"`.
    #[must_use]
    pub fn format_string(&self) -> String {
        self.fields.iter().map(|f| f.kind.format_char()).collect()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", field.name, field.kind)?;
        }
        Ok(())
    }
}
