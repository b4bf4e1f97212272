use anyhow::{Context, Result};
use config::{EngineConfig, DEFAULT_KV_CACHE_BYTES, DEFAULT_KV_TREE};
use partition::{PartitionId, Partitioner};
use schema::{Columns, RowSlice, Schema, WriteBatch};
use sled::transaction::{ConflictableTransactionResult, TransactionError};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::Backend;
use crate::buffer::WriteBuffer;

/// Settings of the embedded key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvOptions {
    /// Page cache capacity in bytes.
    pub cache_capacity: u64,
    /// Tree (sub-database) holding one blob per partition.
    pub tree: String,
    /// Whether `flush()` waits for the store to reach disk.
    pub sync_on_flush: bool,
}

impl Default for KvOptions {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_KV_CACHE_BYTES,
            tree: DEFAULT_KV_TREE.to_string(),
            sync_on_flush: true,
        }
    }
}

impl From<&EngineConfig> for KvOptions {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            cache_capacity: cfg.kv_cache_capacity,
            tree: cfg.kv_tree.clone(),
            sync_on_flush: cfg.sync_on_flush,
        }
    }
}

/// Stores each partition as one contiguous blob under its `"{table}/{date}"`
/// key in a sled tree.
///
/// Appends only validate and buffer. `flush()` rewrites every touched blob
/// (read old value, concatenate, write back) inside a single transaction, so
/// either all buffered partitions are updated or none are. Buffered data is
/// invisible to reads.
pub struct KvBackend {
    schema: Schema,
    partitioner: Partitioner,
    path: PathBuf,
    db: sled::Db,
    tree: sled::Tree,
    buffer: WriteBuffer,
    sync_on_flush: bool,
}

impl KvBackend {
    /// Opens (creating if needed) the store in directory `dir`.
    pub fn open<P: AsRef<Path>>(dir: P, schema: Schema, opts: KvOptions) -> Result<Self> {
        let path = dir.as_ref().to_path_buf();
        let db = sled::Config::new()
            .path(&path)
            .cache_capacity(opts.cache_capacity)
            .open()
            .with_context(|| format!("opening key-value store {}", path.display()))?;
        let tree = db.open_tree(&opts.tree)?;
        info!(
            dir = %path.display(),
            tree = %opts.tree,
            partitions = tree.len(),
            schema = %schema,
            "key-value backend opened"
        );
        Ok(Self {
            schema,
            partitioner: Partitioner::default(),
            path,
            db,
            tree,
            buffer: WriteBuffer::new(),
            sync_on_flush: opts.sync_on_flush,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Partitions with unflushed writes.
    #[must_use]
    pub fn buffered_partitions(&self) -> usize {
        self.buffer.len()
    }

    /// Rows appended since the last successful flush.
    #[must_use]
    pub fn buffered_rows(&self) -> usize {
        self.buffer.approx_rows()
    }

    /// Number of partition blobs in the store.
    #[must_use]
    pub fn stored_partitions(&self) -> usize {
        self.tree.len()
    }

    /// Size in bytes of the stored blob for `(table, date)`, if any.
    pub fn blob_len(&self, table: &str, date: &str) -> Result<Option<usize>> {
        let id = self.partitioner.partition_id(table, date)?;
        Ok(self.tree.get(id.as_bytes())?.map(|blob| blob.len()))
    }

    fn encode_buffer(&self) -> Result<Vec<(PartitionId, Vec<u8>)>> {
        self.buffer
            .iter()
            .map(|(id, batches)| -> Result<(PartitionId, Vec<u8>)> {
                let mut bytes = Vec::new();
                for batch in batches {
                    bytes.extend_from_slice(&self.schema.encode_batch(batch)?);
                }
                Ok((id.clone(), bytes))
            })
            .collect()
    }
}

impl Backend for KvBackend {
    fn name(&self) -> &'static str {
        "kv"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn append(&mut self, table: &str, date: &str, batch: WriteBatch) -> Result<()> {
        let id = self.partitioner.partition_id(table, date)?;
        let rows = self.schema.validate(&batch)?;
        debug!(partition = %id, rows, "kv append buffered");
        self.buffer.push(id, batch, rows);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        // sled may run the closure more than once, so it only does the
        // read-concat-write; encoding is done up front
        let pending = self.encode_buffer()?;
        let written: usize = pending.iter().map(|(_, bytes)| bytes.len()).sum();

        self.tree
            .transaction(|tx| -> ConflictableTransactionResult<(), Infallible> {
                for (id, bytes) in &pending {
                    let mut blob = tx
                        .get(id.as_bytes())?
                        .map(|old| old.to_vec())
                        .unwrap_or_default();
                    blob.extend_from_slice(bytes);
                    tx.insert(id.as_bytes(), blob)?;
                }
                Ok(())
            })
            .map_err(|e| match e {
                TransactionError::Abort(never) => match never {},
                TransactionError::Storage(err) => {
                    anyhow::Error::new(err).context("key-value flush transaction failed")
                }
            })?;

        if self.sync_on_flush {
            self.db.flush().context("syncing key-value store")?;
        }

        debug!(
            partitions = pending.len(),
            rows = self.buffer.approx_rows(),
            bytes = written,
            "kv flush committed"
        );
        self.buffer.clear();
        Ok(())
    }

    fn read_partition(&self, table: &str, date: &str, slice: RowSlice) -> Result<Columns> {
        let id = self.partitioner.partition_id(table, date)?;
        let blob = match self.tree.get(id.as_bytes())? {
            Some(blob) => blob,
            None => return Ok(Columns::new()),
        };
        let cols = self.schema.decode_rows(&blob, slice)?;
        debug!(partition = %id, rows = cols.row_count(), "kv read");
        Ok(cols)
    }
}

impl std::fmt::Debug for KvBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvBackend")
            .field("path", &self.path)
            .field("schema", &self.schema.to_string())
            .field("record_width", &self.schema.record_width())
            .field("stored_partitions", &self.tree.len())
            .field("buffered_partitions", &self.buffer.len())
            .field("buffered_rows", &self.buffer.approx_rows())
            .field("sync_on_flush", &self.sync_on_flush)
            .finish()
    }
}
