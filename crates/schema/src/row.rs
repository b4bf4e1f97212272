use std::collections::BTreeMap;

use crate::columns::Columns;
use crate::value::Value;

/// One row: column name → value. Keys the schema does not declare are ignored
/// by the encoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: BTreeMap<String, Value>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.set(k, v);
        }
        row
    }
}

/// One write request. All three shapes encode to the same record layout.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteBatch {
    /// A single row.
    Row(Row),
    /// Rows in insertion order.
    Rows(Vec<Row>),
    /// Columnar batch: every column holds the same number of values.
    Columns(Columns),
}

impl WriteBatch {
    /// Number of rows the request claims to carry (unvalidated).
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            WriteBatch::Row(_) => 1,
            WriteBatch::Rows(rows) => rows.len(),
            WriteBatch::Columns(cols) => cols.row_count(),
        }
    }
}

impl From<Row> for WriteBatch {
    fn from(row: Row) -> Self {
        WriteBatch::Row(row)
    }
}

impl From<Vec<Row>> for WriteBatch {
    fn from(rows: Vec<Row>) -> Self {
        WriteBatch::Rows(rows)
    }
}

impl From<Columns> for WriteBatch {
    fn from(cols: Columns) -> Self {
        WriteBatch::Columns(cols)
    }
}
