//! Record encoder and columnar decoder.
//!
//! ```text
//! record i:  [field 0][field 1] ... [field n-1]     record_width bytes
//!            ^offset_0 ^offset_1     ^offset_{n-1}
//! partition: record 0 | record 1 | ... (no header, footer or padding)
//! ```
//!
//! Fields are written in native byte order. Encoding always completes into
//! a fresh buffer before returning, so a rejected request never leaves a
//! partial record behind.

use std::ops::Range;

use byteorder::{ByteOrder, NativeEndian};

use crate::columns::{ColumnData, Columns};
use crate::error::{Result, StoreError};
use crate::kind::ColumnKind;
use crate::layout::{FieldLayout, Schema};
use crate::row::{Row, WriteBatch};
use crate::slice::RowSlice;
use crate::value::Value;

impl Schema {
    /// Encodes one row into exactly `record_width()` bytes.
    ///
    /// # Errors
    ///
    /// `StoreError::Encoding` if a declared column is missing from `row` or a
    /// value cannot be stored losslessly in its column's kind.
    pub fn encode_row(&self, row: &Row) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.record_width);
        self.encode_row_into(row, &mut out)?;
        Ok(out)
    }

    /// Encodes rows in order; identical to concatenating [`encode_row`](Self::encode_row).
    pub fn encode_rows(&self, rows: &[Row]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.record_width * rows.len());
        for row in rows {
            self.encode_row_into(row, &mut out)?;
        }
        Ok(out)
    }

    /// Encodes any write request shape.
    pub fn encode_batch(&self, batch: &WriteBatch) -> Result<Vec<u8>> {
        match batch {
            WriteBatch::Row(row) => self.encode_row(row),
            WriteBatch::Rows(rows) => self.encode_rows(rows),
            WriteBatch::Columns(cols) => self.encode_columns(cols),
        }
    }

    /// Encodes a columnar batch row by row.
    pub fn encode_columns(&self, cols: &Columns) -> Result<Vec<u8>> {
        let (sources, rows) = self.column_sources(cols)?;
        let mut out = vec![0u8; self.record_width * rows];
        for row in 0..rows {
            let base = row * self.record_width;
            for (field, data) in self.fields.iter().zip(&sources) {
                let value = column_value(field, data, row)?;
                put_value(&mut out[base + field.offset..base + field.offset + field.width], value);
            }
        }
        Ok(out)
    }

    /// Runs every check the encoder would run without producing bytes.
    /// Returns the number of rows in the request.
    pub fn validate(&self, batch: &WriteBatch) -> Result<usize> {
        match batch {
            WriteBatch::Row(row) => {
                self.validate_row(row)?;
                Ok(1)
            }
            WriteBatch::Rows(rows) => {
                for row in rows {
                    self.validate_row(row)?;
                }
                Ok(rows.len())
            }
            WriteBatch::Columns(cols) => {
                let (sources, rows) = self.column_sources(cols)?;
                for row in 0..rows {
                    for (field, data) in self.fields.iter().zip(&sources) {
                        column_value(field, data, row)?;
                    }
                }
                Ok(rows)
            }
        }
    }

    /// Decodes rows `[start, end)` of `bytes` into one typed sequence per
    /// column. Bounds follow [`RowSlice`] rules.
    ///
    /// # Errors
    ///
    /// `StoreError::Corruption` if `bytes.len()` is not a multiple of
    /// `record_width()`.
    pub fn decode_slice(&self, bytes: &[u8], start: Option<i64>, end: Option<i64>) -> Result<Columns> {
        self.decode_rows(bytes, RowSlice::new(start, end))
    }

    /// Decodes every record in `bytes`.
    pub fn decode_all(&self, bytes: &[u8]) -> Result<Columns> {
        self.decode_rows(bytes, RowSlice::ALL)
    }

    /// Decodes the records selected by `slice`.
    pub fn decode_rows(&self, bytes: &[u8], slice: RowSlice) -> Result<Columns> {
        let width = self.record_width;
        if bytes.len() % width != 0 {
            return Err(StoreError::Corruption {
                len: bytes.len(),
                width,
            });
        }
        let rows = slice.resolve(bytes.len() / width);

        let mut out = Columns::new();
        for field in &self.fields {
            out.insert(field.name.clone(), decode_field(bytes, width, field, rows.clone()));
        }
        Ok(out)
    }

    fn encode_row_into(&self, row: &Row, out: &mut Vec<u8>) -> Result<()> {
        let base = out.len();
        out.resize(base + self.record_width, 0);
        for field in &self.fields {
            let value = row_value(field, row)?;
            put_value(&mut out[base + field.offset..base + field.offset + field.width], value);
        }
        Ok(())
    }

    fn validate_row(&self, row: &Row) -> Result<()> {
        for field in &self.fields {
            row_value(field, row)?;
        }
        Ok(())
    }

    /// Resolves each schema field to its source column and checks that all
    /// columns have the same length.
    fn column_sources<'a>(&self, cols: &'a Columns) -> Result<(Vec<&'a ColumnData>, usize)> {
        let mut sources = Vec::with_capacity(self.fields.len());
        let mut rows: Option<usize> = None;
        for field in &self.fields {
            let data = cols.get(&field.name).ok_or_else(|| {
                StoreError::Encoding(format!("batch is missing column '{}'", field.name))
            })?;
            match rows {
                Some(n) if n != data.len() => {
                    return Err(StoreError::Encoding(format!(
                        "column '{}' has {} values, expected {}",
                        field.name,
                        data.len(),
                        n
                    )))
                }
                _ => rows = Some(data.len()),
            }
            sources.push(data);
        }
        Ok((sources, rows.unwrap_or(0)))
    }
}

fn row_value(field: &FieldLayout, row: &Row) -> Result<Value> {
    let value = row
        .get(&field.name)
        .ok_or_else(|| StoreError::Encoding(format!("row is missing column '{}'", field.name)))?;
    coerce(field, value)
}

fn column_value(field: &FieldLayout, data: &ColumnData, row: usize) -> Result<Value> {
    let value = data.get(row).ok_or_else(|| {
        StoreError::Encoding(format!("column '{}' has no value at row {}", field.name, row))
    })?;
    coerce(field, value)
}

fn coerce(field: &FieldLayout, value: Value) -> Result<Value> {
    value.cast(field.kind).ok_or_else(|| {
        StoreError::Encoding(format!(
            "value {} ({}) cannot be stored losslessly in {} column '{}'",
            value,
            value.kind(),
            field.kind,
            field.name
        ))
    })
}

/// Writes `value` into `buf`; `value` has already been cast to the field kind
/// so `buf.len() == value.kind().width()`.
fn put_value(buf: &mut [u8], value: Value) {
    match value {
        Value::I8(v) => buf[0] = v as u8,
        Value::U8(v) => buf[0] = v,
        Value::I16(v) => NativeEndian::write_i16(buf, v),
        Value::U16(v) => NativeEndian::write_u16(buf, v),
        Value::I32(v) => NativeEndian::write_i32(buf, v),
        Value::U32(v) => NativeEndian::write_u32(buf, v),
        Value::I64(v) => NativeEndian::write_i64(buf, v),
        Value::U64(v) => NativeEndian::write_u64(buf, v),
        Value::F32(v) => NativeEndian::write_f32(buf, v),
        Value::F64(v) => NativeEndian::write_f64(buf, v),
    }
}

fn decode_field(bytes: &[u8], width: usize, field: &FieldLayout, rows: Range<usize>) -> ColumnData {
    let at = |row: usize| field_bytes(bytes, width, field, row);
    match field.kind {
        ColumnKind::Int8 => ColumnData::I8(rows.map(|r| at(r)[0] as i8).collect()),
        ColumnKind::UInt8 => ColumnData::U8(rows.map(|r| at(r)[0]).collect()),
        ColumnKind::Int16 => ColumnData::I16(rows.map(|r| NativeEndian::read_i16(at(r))).collect()),
        ColumnKind::UInt16 => ColumnData::U16(rows.map(|r| NativeEndian::read_u16(at(r))).collect()),
        ColumnKind::Int32 => ColumnData::I32(rows.map(|r| NativeEndian::read_i32(at(r))).collect()),
        ColumnKind::UInt32 => ColumnData::U32(rows.map(|r| NativeEndian::read_u32(at(r))).collect()),
        ColumnKind::Int64 => ColumnData::I64(rows.map(|r| NativeEndian::read_i64(at(r))).collect()),
        ColumnKind::UInt64 => ColumnData::U64(rows.map(|r| NativeEndian::read_u64(at(r))).collect()),
        ColumnKind::Float32 => ColumnData::F32(rows.map(|r| NativeEndian::read_f32(at(r))).collect()),
        ColumnKind::Float64 => ColumnData::F64(rows.map(|r| NativeEndian::read_f64(at(r))).collect()),
    }
}

#[inline]
fn field_bytes<'a>(bytes: &'a [u8], width: usize, field: &FieldLayout, row: usize) -> &'a [u8] {
    let p = row * width + field.offset;
    &bytes[p..p + field.width]
}
