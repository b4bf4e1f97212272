use anyhow::{Context, Result};
use flatfile::{LogReader, LogWriter};
use partition::Partitioner;
use schema::{Columns, RowSlice, Schema, WriteBatch};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::Backend;

/// One append-only log file per partition under `base_dir/table/date/`.
///
/// Writers are opened lazily on the first append to a partition and kept
/// until [`flush`](Backend::flush), which syncs and closes all of them.
/// Appending to a partition after a flush reopens its log in append mode.
/// Reads map the log file directly and never see bytes still sitting in a
/// writer's buffer.
pub struct FlatFileBackend {
    schema: Schema,
    partitioner: Partitioner,
    writers: HashMap<PathBuf, LogWriter>,
    sync_on_flush: bool,
}

impl FlatFileBackend {
    /// Opens (creating if needed) a partition tree rooted at `base_dir`.
    pub fn open<P: AsRef<Path>>(base_dir: P, schema: Schema) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir)
            .with_context(|| format!("creating data directory {}", base_dir.display()))?;
        info!(dir = %base_dir.display(), schema = %schema, "flat-file backend opened");
        Ok(Self {
            schema,
            partitioner: Partitioner::with_base_dir(base_dir),
            writers: HashMap::new(),
            sync_on_flush: true,
        })
    }

    /// Whether `flush()` also fsyncs every log. Defaults to `true`.
    #[must_use]
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync_on_flush = sync;
        self
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.partitioner.base_dir()
    }

    /// Number of partition logs currently held open for writing.
    #[must_use]
    pub fn open_writers(&self) -> usize {
        self.writers.len()
    }
}

impl Backend for FlatFileBackend {
    fn name(&self) -> &'static str {
        "flatfile"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn append(&mut self, table: &str, date: &str, batch: WriteBatch) -> Result<()> {
        // encode before touching the filesystem so a bad batch writes nothing
        let bytes = self.schema.encode_batch(&batch)?;
        let path = self.partitioner.log_path(table, date)?;

        let writer = match self.writers.entry(path) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                if let Some(dir) = e.key().parent() {
                    fs::create_dir_all(dir)
                        .with_context(|| format!("creating partition {}", dir.display()))?;
                }
                let writer = LogWriter::open(e.key())
                    .with_context(|| format!("opening log {}", e.key().display()))?;
                e.insert(writer)
            }
        };
        writer.append(&bytes)?;

        debug!(
            table,
            date,
            rows = bytes.len() / self.schema.record_width(),
            bytes = bytes.len(),
            "flat-file append"
        );
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.writers.is_empty() {
            return Ok(());
        }
        for (path, writer) in self.writers.iter_mut() {
            writer
                .flush(self.sync_on_flush)
                .with_context(|| format!("flushing log {}", path.display()))?;
        }
        let closed = self.writers.len();
        self.writers.clear();
        debug!(partitions = closed, sync = self.sync_on_flush, "flat-file flush");
        Ok(())
    }

    fn read_partition(&self, table: &str, date: &str, slice: RowSlice) -> Result<Columns> {
        let path = self.partitioner.log_path(table, date)?;
        let reader = match LogReader::open(&path)
            .with_context(|| format!("mapping log {}", path.display()))?
        {
            Some(reader) => reader,
            None => return Ok(Columns::new()),
        };
        let cols = reader.decode(&self.schema, slice)?;
        debug!(table, date, rows = cols.row_count(), "flat-file read");
        Ok(cols)
    }
}

impl std::fmt::Debug for FlatFileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatFileBackend")
            .field("base_dir", &self.partitioner.base_dir())
            .field("schema", &self.schema.to_string())
            .field("record_width", &self.schema.record_width())
            .field("open_writers", &self.writers.len())
            .field("sync_on_flush", &self.sync_on_flush)
            .finish()
    }
}
