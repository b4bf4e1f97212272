//! Storage backends and the request types shared by all of them.
//!
//! A backend only knows how to append to, flush, and read back a single
//! partition. Date ranges, filtering, and the parallel read fan-out live in
//! the engine and work the same for every backend.

mod flat;
mod kv;

pub use self::flat::FlatFileBackend;
pub use self::kv::{KvBackend, KvOptions};

use anyhow::Result;
use schema::{Columns, RowSlice, Schema, WriteBatch};
use std::fmt;

/// A physical storage strategy for day partitions.
///
/// Implementations must be `Send + Sync`: range reads call
/// [`read_partition`](Backend::read_partition) from several worker threads
/// at once. Mutation goes through `&mut self`, so a backend is never written
/// and read concurrently.
pub trait Backend: Send + Sync + fmt::Debug {
    /// Short name for logs and `STATS` output.
    fn name(&self) -> &'static str;

    /// The record layout every partition of this backend uses.
    fn schema(&self) -> &Schema;

    /// Appends `batch` to the `(table, date)` partition.
    ///
    /// Invalid batches (missing columns, lossy values, ragged columns) are
    /// rejected here and leave storage untouched. Appended rows are not
    /// guaranteed to be visible to reads until [`flush`](Backend::flush).
    fn append(&mut self, table: &str, date: &str, batch: WriteBatch) -> Result<()>;

    /// Makes every buffered append durable and visible to reads.
    fn flush(&mut self) -> Result<()>;

    /// Reads the rows selected by `slice` from one partition.
    ///
    /// A partition that was never written returns a `Columns` with no
    /// columns; it is not an error.
    fn read_partition(&self, table: &str, date: &str, slice: RowSlice) -> Result<Columns>;
}

/// Which partitions a read covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSpec {
    /// A single day, `YYYY-MM-DD`.
    Day(String),
    /// Every day from `start` to `end`, both inclusive.
    Range { start: String, end: String },
}

impl DateSpec {
    pub fn day(date: impl Into<String>) -> Self {
        DateSpec::Day(date.into())
    }

    pub fn range(start: impl Into<String>, end: impl Into<String>) -> Self {
        DateSpec::Range {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl From<&str> for DateSpec {
    fn from(date: &str) -> Self {
        DateSpec::day(date)
    }
}

impl From<String> for DateSpec {
    fn from(date: String) -> Self {
        DateSpec::Day(date)
    }
}

impl From<(&str, &str)> for DateSpec {
    fn from((start, end): (&str, &str)) -> Self {
        DateSpec::range(start, end)
    }
}

impl From<(String, String)> for DateSpec {
    fn from((start, end): (String, String)) -> Self {
        DateSpec::Range { start, end }
    }
}

/// Row predicate: gets the assembled columns, returns one flag per row.
pub type Predicate = dyn Fn(&Columns) -> Vec<bool>;

/// Optional knobs of a read.
///
/// `start`/`end` slice a single-day read with Python rules (negative counts
/// from the end, out of range clamps). They are ignored for date ranges.
#[derive(Default)]
pub struct ReadOptions {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub filter: Option<Box<Predicate>>,
}

impl ReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn slice(mut self, start: Option<i64>, end: Option<i64>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    #[must_use]
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Columns) -> Vec<bool> + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    pub(crate) fn row_slice(&self) -> RowSlice {
        RowSlice::new(self.start, self.end)
    }
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}
