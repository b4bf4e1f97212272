//! # Engine - ChronoStore time-series engine
//!
//! Ties the [`schema`], [`partition`], and [`flatfile`] crates together with
//! an embedded key-value store into a day-partitioned, append-only store for
//! fixed-width numeric records.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌──────────────────────────────────────────────────────┐
//! │                       ENGINE                         │
//! │                                                      │
//! │ write.rs → Backend::append  (validate, write/buffer) │
//! │            Backend::flush   (durable + visible)      │
//! │                                                      │
//! │ read.rs  → one day:  Backend::read_partition         │
//! │            range:    every day on the read pool,     │
//! │                      concatenated in date order      │
//! │            where:    mask over assembled columns     │
//! └────────────────┬───────────────────┬─────────────────┘
//!                  v                   v
//!         FlatFileBackend          KvBackend
//!    base/table/date/data.bin   sled tree, key "table/date"
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module      | Purpose                                                  |
//! |-------------|----------------------------------------------------------|
//! | [`lib.rs`]  | `Engine` struct, constructors, accessors, `Debug`, `Drop` |
//! | [`backend`] | `Backend` trait, `DateSpec`, `ReadOptions`, both backends |
//! | [`buffer`]  | Unencoded per-partition write buffer of the kv backend   |
//! | [`write`]   | `append()`, `flush()`                                    |
//! | [`read`]    | `read()`, `read_range()`, `filter()`, `read_as_table()`  |
//! | [`table`]   | Row-major `Table` view                                   |
//!
//! ## Visibility
//!
//! Appends become visible to reads only after [`Engine::flush`]. The flat-file
//! backend keeps bytes in per-partition write buffers; the key-value backend
//! keeps whole batches in memory and commits them in one transaction.
//! Dropping the engine flushes on a best-effort basis.
pub mod backend;
mod buffer;
mod read;
mod table;
mod write;

use anyhow::Result;
use config::{BackendKind, EngineConfig};
use rayon::{ThreadPool, ThreadPoolBuilder};
use schema::Schema;
use tracing::{info, warn};

pub use backend::{Backend, DateSpec, FlatFileBackend, KvBackend, KvOptions, ReadOptions};
pub use buffer::WriteBuffer;
pub use table::Table;

/// The storage engine: one backend plus the worker pool for range reads.
///
/// # Write Path
///
/// 1. The backend validates the batch against the schema; a bad batch fails
///    before anything is written or buffered.
/// 2. Flat file: encode and append to the partition's log writer.
///    Key-value: buffer the batch under its partition key.
/// 3. `flush()` syncs and closes every log, or commits the buffer in one
///    key-value transaction.
///
/// # Read Path
///
/// 1. Validate table and date(s).
/// 2. One day: read the partition, slicing with `start`/`end`.
/// 3. Range: read every day on the pool, concatenate in date order.
/// 4. Apply the predicate, if any, to the assembled columns.
pub struct Engine {
    pub(crate) backend: Box<dyn Backend>,
    pub(crate) pool: ThreadPool,
    pub(crate) read_workers: usize,
    /// Rows accepted by `append` since the engine was opened.
    pub(crate) appended_rows: u64,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("backend", &self.backend)
            .field("read_workers", &self.read_workers)
            .field("appended_rows", &self.appended_rows)
            .finish()
    }
}

impl Engine {
    /// Wraps `backend` with a read pool sized to the number of CPUs.
    pub fn new<B: Backend + 'static>(backend: B) -> Result<Self> {
        Self::with_read_workers(backend, num_cpus::get())
    }

    /// Wraps `backend` with a read pool of `workers` threads (at least one).
    pub fn with_read_workers<B: Backend + 'static>(backend: B, workers: usize) -> Result<Self> {
        Self::from_boxed(Box::new(backend), workers)
    }

    /// Builds the backend `config` asks for, storing records laid out by
    /// `schema`.
    ///
    /// The flat-file backend uses `config.data_dir` as its partition root;
    /// the key-value backend keeps its database in that directory.
    pub fn open(config: &EngineConfig, schema: Schema) -> Result<Self> {
        let backend: Box<dyn Backend> = match config.backend {
            BackendKind::FlatFile => Box::new(
                FlatFileBackend::open(&config.data_dir, schema)?.with_sync(config.sync_on_flush),
            ),
            BackendKind::Kv => Box::new(KvBackend::open(
                &config.data_dir,
                schema,
                KvOptions::from(config),
            )?),
        };
        Self::from_boxed(backend, config.read_workers)
    }

    /// Like [`with_read_workers`](Engine::with_read_workers) for an already
    /// boxed backend.
    pub fn from_boxed(backend: Box<dyn Backend>, workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("chrono-read-{i}"))
            .build()?;
        info!(backend = backend.name(), read_workers = workers, "engine ready");
        Ok(Self {
            backend,
            pool,
            read_workers: workers,
            appended_rows: 0,
        })
    }

    /// The underlying backend.
    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        &*self.backend
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        self.backend.schema()
    }

    /// Size of the range-read worker pool.
    #[must_use]
    pub fn read_workers(&self) -> usize {
        self.read_workers
    }

    /// Rows accepted by `append` since the engine was opened.
    #[must_use]
    pub fn appended_rows(&self) -> u64 {
        self.appended_rows
    }
}

/// Best-effort flush on drop.
///
/// Errors cannot propagate out of `Drop`; they are logged and the unflushed
/// appends are lost.
impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(e) = self.backend.flush() {
            warn!(backend = self.backend.name(), error = %e, "flush on drop failed");
        }
    }
}

#[cfg(test)]
mod tests;
