/// Read path: `read()`, `read_range()`, `filter()`, `read_as_table()`.
///
/// A single-day read is one `read_partition` call on the backend. A range
/// read enumerates every calendar day, reads them on the engine's worker
/// pool, and concatenates the results in ascending date order. The optional
/// predicate runs once, on the caller's thread, over the assembled columns.
use anyhow::Result;
use partition::dates_between;
use rayon::prelude::*;
use rayon::ThreadPool;
use schema::{Columns, RowSlice};
use tracing::debug;

use crate::backend::{Backend, DateSpec, ReadOptions};
use crate::{Engine, Table};

impl Engine {
    /// Reads one day or a date range of `table`.
    ///
    /// # Returns
    ///
    /// One sequence per schema column. If none of the requested partitions
    /// exist the result has no columns at all; if some exist but no row
    /// survives slicing or filtering, every column is present and empty.
    ///
    /// # Errors
    ///
    /// `StoreError::Validation` for a malformed date, a bad table name, or an
    /// inverted range; `StoreError::Corruption` for a partition whose size is
    /// not a whole number of records; `StoreError::FilterShape` if the
    /// predicate returns the wrong number of flags.
    pub fn read(&self, table: &str, dates: impl Into<DateSpec>, opts: ReadOptions) -> Result<Columns> {
        read_columns(
            &*self.backend,
            &self.pool,
            table,
            &dates.into(),
            opts.row_slice(),
            opts.filter.as_deref(),
        )
    }

    /// Every row of `table` from `start` to `end`, both days inclusive.
    pub fn read_range(&self, table: &str, start: &str, end: &str) -> Result<Columns> {
        self.read(table, DateSpec::range(start, end), ReadOptions::new())
    }

    /// Reads `dates` and keeps the rows for which `predicate` returns `true`.
    pub fn filter<F>(&self, table: &str, dates: impl Into<DateSpec>, predicate: F) -> Result<Columns>
    where
        F: Fn(&Columns) -> Vec<bool>,
    {
        let predicate: &dyn Fn(&Columns) -> Vec<bool> = &predicate;
        read_columns(
            &*self.backend,
            &self.pool,
            table,
            &dates.into(),
            RowSlice::ALL,
            Some(predicate),
        )
    }

    /// Same as [`read`](Engine::read), returned row-major.
    pub fn read_as_table(
        &self,
        table: &str,
        dates: impl Into<DateSpec>,
        opts: ReadOptions,
    ) -> Result<Table> {
        Ok(Table::from(self.read(table, dates, opts)?))
    }
}

pub(crate) fn read_columns(
    backend: &dyn Backend,
    pool: &ThreadPool,
    table: &str,
    dates: &DateSpec,
    slice: RowSlice,
    predicate: Option<&dyn Fn(&Columns) -> Vec<bool>>,
) -> Result<Columns> {
    let cols = match dates {
        DateSpec::Day(date) => backend.read_partition(table, date, slice)?,
        DateSpec::Range { start, end } => read_days(backend, pool, table, start, end)?,
    };

    // nothing stored: there is nothing to hand the predicate
    if cols.is_empty() {
        return Ok(cols);
    }
    match predicate {
        Some(predicate) => {
            let mask = predicate(&cols);
            let kept = cols.filter(&mask)?;
            debug!(table, rows = cols.row_count(), kept = kept.row_count(), "filter applied");
            Ok(kept)
        }
        None => Ok(cols),
    }
}

fn read_days(
    backend: &dyn Backend,
    pool: &ThreadPool,
    table: &str,
    start: &str,
    end: &str,
) -> Result<Columns> {
    let days = dates_between(start, end)?;

    // indexed parallel collect keeps day order
    let parts: Vec<Columns> = pool.install(|| {
        days.par_iter()
            .map(|day| backend.read_partition(table, day, RowSlice::ALL))
            .collect::<Result<Vec<_>>>()
    })?;

    let mut merged = Columns::new();
    for part in parts {
        merged.append(part)?;
    }
    debug!(
        table,
        start,
        end,
        days = days.len(),
        rows = merged.row_count(),
        "range read"
    );
    Ok(merged)
}
