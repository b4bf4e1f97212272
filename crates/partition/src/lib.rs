//! # Partition - (table, day) addressing
//!
//! Maps a table name and an ISO calendar date to a [`PartitionId`], the one
//! identity both backends share:
//!
//! ```text
//! PartitionId  "ES/2025-06-14"
//!   flat file  {base_dir}/ES/2025-06-14/data.bin
//!   key-value  key b"ES/2025-06-14"
//! ```
//!
//! Everything here is pure: no I/O, and the only failure is
//! [`StoreError::Validation`] for a malformed date, an inverted range, or a
//! table name that cannot be used as a path component.

use chrono::{Duration, NaiveDate};
use schema::{Result, StoreError};
use std::fmt;
use std::path::{Path, PathBuf};

/// Fixed name of the log file inside every flat-file partition directory.
pub const LOG_FILE_NAME: &str = "data.bin";

/// Date format of partition keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical `"{table}/{date}"` partition identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionId {
    key: String,
    split: usize,
}

impl PartitionId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Key-value store key.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.key.as_bytes()
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.key[..self.split]
    }

    #[must_use]
    pub fn date(&self) -> &str {
        &self.key[self.split + 1..]
    }

    /// Partition directory under `base_dir`: `base_dir/table/date`.
    #[must_use]
    pub fn to_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(self.table()).join(self.date())
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Builds partition identities and, for the flat-file backend, their paths.
#[derive(Debug, Clone, Default)]
pub struct Partitioner {
    base_dir: PathBuf,
}

impl Partitioner {
    /// A partitioner rooted at `base_dir`. The key-value backend, which never
    /// touches paths, can use `Partitioner::default()`.
    pub fn with_base_dir<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Validates `table` and `date` and returns their partition identity.
    pub fn partition_id(&self, table: &str, date: &str) -> Result<PartitionId> {
        validate_table(table)?;
        parse_date(date)?;
        Ok(PartitionId {
            key: format!("{table}/{date}"),
            split: table.len(),
        })
    }

    /// Directory holding the partition's log.
    pub fn partition_path(&self, table: &str, date: &str) -> Result<PathBuf> {
        Ok(self.partition_id(table, date)?.to_path(&self.base_dir))
    }

    /// Full path of the partition's log file.
    pub fn log_path(&self, table: &str, date: &str) -> Result<PathBuf> {
        Ok(self.partition_path(table, date)?.join(LOG_FILE_NAME))
    }
}

/// Parses a `YYYY-MM-DD` calendar date. The string must already be in
/// canonical form (`2025-6-1` is rejected), since it doubles as a key.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    if !is_iso_day_shape(date) {
        return Err(StoreError::Validation(format!(
            "date '{date}' is not in YYYY-MM-DD form"
        )));
    }
    let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|e| StoreError::Validation(format!("invalid date '{date}': {e}")))?;
    if parsed.format(DATE_FORMAT).to_string() != date {
        return Err(StoreError::Validation(format!(
            "date '{date}' is not in YYYY-MM-DD form"
        )));
    }
    Ok(parsed)
}

/// Every date from `start` to `end`, both inclusive, in ascending order.
///
/// # Errors
///
/// `StoreError::Validation` if either date is malformed or `start > end`.
pub fn dates_between(start: &str, end: &str) -> Result<Vec<String>> {
    let first = parse_date(start)?;
    let last = parse_date(end)?;
    if first > last {
        return Err(StoreError::Validation(format!(
            "inverted date range: {start} is after {end}"
        )));
    }
    let days = (last - first).num_days();
    Ok((0..=days)
        .map(|i| (first + Duration::days(i)).format(DATE_FORMAT).to_string())
        .collect())
}

/// Exactly `dddd-dd-dd` in ASCII. chrono's `%Y` also takes signed and
/// five-digit years, which must not become partition keys.
fn is_iso_day_shape(date: &str) -> bool {
    let b = date.as_bytes();
    b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        })
}

fn validate_table(table: &str) -> Result<()> {
    if table.is_empty() {
        return Err(StoreError::Validation("table name must not be empty".into()));
    }
    if table == "." || table == ".." || table.contains(['/', '\\', '\0']) {
        return Err(StoreError::Validation(format!(
            "table name '{table}' cannot be used as a partition path component"
        )));
    }
    Ok(())
}
