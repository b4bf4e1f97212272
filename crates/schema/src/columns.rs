//! Columnar containers: [`ColumnData`] is one typed sequence, [`Columns`] is
//! the ordered name → sequence mapping returned by every read.

use std::ops::Index;

use crate::error::{Result, StoreError};
use crate::kind::ColumnKind;
use crate::value::Value;

/// A typed, contiguous sequence of values for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// Evaluates `$body` with `$v` bound to the inner vector, whatever its type.
macro_rules! with_vec {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ColumnData::I8($v) => $body,
            ColumnData::I16($v) => $body,
            ColumnData::I32($v) => $body,
            ColumnData::I64($v) => $body,
            ColumnData::U8($v) => $body,
            ColumnData::U16($v) => $body,
            ColumnData::U32($v) => $body,
            ColumnData::U64($v) => $body,
            ColumnData::F32($v) => $body,
            ColumnData::F64($v) => $body,
        }
    };
}

/// Like `with_vec!`, but rewraps the resulting vector in the same variant.
macro_rules! map_vec {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ColumnData::I8($v) => ColumnData::I8($body),
            ColumnData::I16($v) => ColumnData::I16($body),
            ColumnData::I32($v) => ColumnData::I32($body),
            ColumnData::I64($v) => ColumnData::I64($body),
            ColumnData::U8($v) => ColumnData::U8($body),
            ColumnData::U16($v) => ColumnData::U16($body),
            ColumnData::U32($v) => ColumnData::U32($body),
            ColumnData::U64($v) => ColumnData::U64($body),
            ColumnData::F32($v) => ColumnData::F32($body),
            ColumnData::F64($v) => ColumnData::F64($body),
        }
    };
}

macro_rules! typed_accessors {
    ($($name:ident => $variant:ident : $t:ty),* $(,)?) => {
        $(
            #[must_use]
            pub fn $name(&self) -> Option<&[$t]> {
                match self {
                    ColumnData::$variant(v) => Some(v),
                    _ => None,
                }
            }
        )*
    };
}

macro_rules! column_from_vec {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$t>> for ColumnData {
                fn from(v: Vec<$t>) -> Self {
                    ColumnData::$variant(v)
                }
            }
        )*
    };
}

column_from_vec!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    f32 => F32, f64 => F64,
);

impl ColumnData {
    /// An empty sequence of the given kind with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(kind: ColumnKind, capacity: usize) -> Self {
        match kind {
            ColumnKind::Int8 => ColumnData::I8(Vec::with_capacity(capacity)),
            ColumnKind::Int16 => ColumnData::I16(Vec::with_capacity(capacity)),
            ColumnKind::Int32 => ColumnData::I32(Vec::with_capacity(capacity)),
            ColumnKind::Int64 => ColumnData::I64(Vec::with_capacity(capacity)),
            ColumnKind::UInt8 => ColumnData::U8(Vec::with_capacity(capacity)),
            ColumnKind::UInt16 => ColumnData::U16(Vec::with_capacity(capacity)),
            ColumnKind::UInt32 => ColumnData::U32(Vec::with_capacity(capacity)),
            ColumnKind::UInt64 => ColumnData::U64(Vec::with_capacity(capacity)),
            ColumnKind::Float32 => ColumnData::F32(Vec::with_capacity(capacity)),
            ColumnKind::Float64 => ColumnData::F64(Vec::with_capacity(capacity)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::I8(_) => ColumnKind::Int8,
            ColumnData::I16(_) => ColumnKind::Int16,
            ColumnData::I32(_) => ColumnKind::Int32,
            ColumnData::I64(_) => ColumnKind::Int64,
            ColumnData::U8(_) => ColumnKind::UInt8,
            ColumnData::U16(_) => ColumnKind::UInt16,
            ColumnData::U32(_) => ColumnKind::UInt32,
            ColumnData::U64(_) => ColumnKind::UInt64,
            ColumnData::F32(_) => ColumnKind::Float32,
            ColumnData::F64(_) => ColumnKind::Float64,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        with_vec!(self, v => v.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value at `index` as a tagged [`Value`].
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        with_vec!(self, v => v.get(index).map(|x| Value::from(*x)))
    }

    /// Iterates the sequence as tagged values.
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Appends `other` to the end of this sequence.
    ///
    /// # Errors
    ///
    /// `StoreError::Schema` if the kinds differ, which only happens when
    /// mixing results read under different schemas.
    pub fn extend_from(&mut self, other: &ColumnData) -> Result<()> {
        match (self, other) {
            (ColumnData::I8(a), ColumnData::I8(b)) => a.extend_from_slice(b),
            (ColumnData::I16(a), ColumnData::I16(b)) => a.extend_from_slice(b),
            (ColumnData::I32(a), ColumnData::I32(b)) => a.extend_from_slice(b),
            (ColumnData::I64(a), ColumnData::I64(b)) => a.extend_from_slice(b),
            (ColumnData::U8(a), ColumnData::U8(b)) => a.extend_from_slice(b),
            (ColumnData::U16(a), ColumnData::U16(b)) => a.extend_from_slice(b),
            (ColumnData::U32(a), ColumnData::U32(b)) => a.extend_from_slice(b),
            (ColumnData::U64(a), ColumnData::U64(b)) => a.extend_from_slice(b),
            (ColumnData::F32(a), ColumnData::F32(b)) => a.extend_from_slice(b),
            (ColumnData::F64(a), ColumnData::F64(b)) => a.extend_from_slice(b),
            (a, b) => {
                return Err(StoreError::Schema(format!(
                    "cannot concatenate {} column with {} column",
                    a.kind(),
                    b.kind()
                )))
            }
        }
        Ok(())
    }

    /// Keeps the values whose mask entry is `true`. `mask.len()` must equal
    /// `self.len()`; [`Columns::filter`] checks this before calling.
    #[must_use]
    pub fn select(&self, mask: &[bool]) -> ColumnData {
        map_vec!(self, v => v
            .iter()
            .zip(mask)
            .filter_map(|(x, keep)| keep.then_some(*x))
            .collect())
    }

    /// Returns the values in `range` as a new sequence.
    #[must_use]
    pub fn slice(&self, range: std::ops::Range<usize>) -> ColumnData {
        map_vec!(self, v => v[range].to_vec())
    }

    typed_accessors!(
        as_i8 => I8: i8,
        as_i16 => I16: i16,
        as_i32 => I32: i32,
        as_i64 => I64: i64,
        as_u8 => U8: u8,
        as_u16 => U16: u16,
        as_u32 => U32: u32,
        as_u64 => U64: u64,
        as_f32 => F32: f32,
        as_f64 => F64: f64,
    );
}

/// Ordered mapping from column name to [`ColumnData`].
///
/// A `Columns` with no columns at all is the "nothing was stored" result; a
/// `Columns` whose sequences are all empty means partitions existed but no
/// row was selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    names: Vec<String>,
    data: Vec<ColumnData>,
}

impl Columns {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column at the end, replacing any column with the same name.
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<ColumnData>) {
        let name = name.into();
        let data = data.into();
        match self.position(&name) {
            Some(i) => self.data[i] = data,
            None => {
                self.names.push(name);
                self.data.push(data);
            }
        }
    }

    /// Builder-style [`insert`](Columns::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, data: impl Into<ColumnData>) -> Self {
        self.insert(name, data);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColumnData> {
        self.position(name).map(|i| &self.data[i])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Column names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnData)> {
        self.names.iter().map(String::as_str).zip(self.data.iter())
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.names.len()
    }

    /// `true` when there are no columns at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of rows, taken from the first column (0 when there are none).
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.first().map_or(0, ColumnData::len)
    }

    /// Concatenates `other` after `self`, column by column.
    ///
    /// When `self` has no columns it simply takes `other`'s; an empty
    /// `other` contributes nothing.
    pub fn append(&mut self, other: Columns) -> Result<()> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            *self = other;
            return Ok(());
        }
        for (name, data) in other.names.iter().zip(&other.data) {
            let i = self.position(name).ok_or_else(|| {
                StoreError::Schema(format!("column '{name}' missing from merge target"))
            })?;
            self.data[i].extend_from(data)?;
        }
        Ok(())
    }

    /// Applies a boolean mask to every column.
    ///
    /// # Errors
    ///
    /// `StoreError::FilterShape` when `mask.len() != self.row_count()`.
    pub fn filter(&self, mask: &[bool]) -> Result<Columns> {
        let expected = self.row_count();
        if mask.len() != expected {
            return Err(StoreError::FilterShape {
                expected,
                actual: mask.len(),
            });
        }
        Ok(Columns {
            names: self.names.clone(),
            data: self.data.iter().map(|d| d.select(mask)).collect(),
        })
    }

    /// The values of row `index`, in column order.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Vec<Value>> {
        self.data.iter().map(|d| d.get(index)).collect()
    }
}

impl Index<&str> for Columns {
    type Output = ColumnData;

    fn index(&self, name: &str) -> &ColumnData {
        match self.get(name) {
            Some(data) => data,
            None => panic!("no column named '{name}'"),
        }
    }
}
