/// Write path: `append()` and `flush()`.
///
/// The engine adds nothing on top of the backend here beyond tracing: the
/// backend validates, buffers or writes, and makes data visible on flush.
use anyhow::Result;
use schema::WriteBatch;
use tracing::debug;

use crate::Engine;

impl Engine {
    /// Appends one row, a list of rows, or a columnar batch to the
    /// `(table, date)` partition.
    ///
    /// # Errors
    ///
    /// `StoreError::Encoding` when the batch does not match the schema and
    /// `StoreError::Validation` for a bad date or table name. Either way
    /// nothing is written.
    pub fn append(&mut self, table: &str, date: &str, batch: impl Into<WriteBatch>) -> Result<()> {
        let batch = batch.into();
        let rows = batch.row_count();
        self.backend.append(table, date, batch)?;
        self.appended_rows += rows as u64;
        Ok(())
    }

    /// Makes every append so far durable and visible to reads.
    pub fn flush(&mut self) -> Result<()> {
        self.backend.flush()?;
        debug!(backend = self.backend.name(), "engine flush");
        Ok(())
    }
}
