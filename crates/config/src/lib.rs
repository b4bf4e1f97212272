//! # Config - engine settings
//!
//! All settings come from environment variables with defaults, so the shell
//! and the benchmarks can be pointed at a different directory or backend
//! without recompiling:
//!
//! ```text
//! CHRONO_DATA_DIR      data directory                  (default: "data")
//! CHRONO_BACKEND       "flatfile" or "kv"              (default: "flatfile")
//! CHRONO_READ_WORKERS  range-read worker threads       (default: CPU count)
//! CHRONO_SYNC          fsync on flush                  (default: "true")
//! CHRONO_KV_CACHE_MB   key-value page cache in MiB     (default: 1024)
//! CHRONO_KV_TREE       key-value tree name             (default: "partitions")
//! CHRONO_LOG           log filter if RUST_LOG is unset (default: "info")
//! ```
//!
//! Values that fail to parse fall back to their default. An unknown backend
//! name is an error, since silently picking the other storage format would
//! hide data.

use anyhow::{bail, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default key-value page cache size (1 GiB).
pub const DEFAULT_KV_CACHE_BYTES: u64 = 1024 * 1024 * 1024;

/// Default key-value tree (sub-database) name.
pub const DEFAULT_KV_TREE: &str = "partitions";

/// Which physical storage strategy the engine uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Append-only log file per partition, memory-mapped reads.
    #[default]
    FlatFile,
    /// One blob per partition in the embedded key-value store.
    Kv,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "flatfile" | "flat" | "file" => Ok(BackendKind::FlatFile),
            "kv" | "sled" | "lmdb" => Ok(BackendKind::Kv),
            other => bail!("unknown backend '{}' (expected 'flatfile' or 'kv')", other),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::FlatFile => f.write_str("flatfile"),
            BackendKind::Kv => f.write_str("kv"),
        }
    }
}

/// Everything needed to open an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Root directory: partition tree for the flat-file backend, database
    /// directory for the key-value backend.
    pub data_dir: PathBuf,
    pub backend: BackendKind,
    /// Size of the worker pool used for multi-day range reads.
    pub read_workers: usize,
    /// If `true`, `flush()` forces data to stable storage (fsync).
    pub sync_on_flush: bool,
    /// Key-value page cache capacity in bytes.
    pub kv_cache_capacity: u64,
    /// Name of the key-value tree holding partition blobs.
    pub kv_tree: String,
    /// Default log filter for binaries that install a subscriber.
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            backend: BackendKind::FlatFile,
            read_workers: num_cpus::get().max(1),
            sync_on_flush: true,
            kv_cache_capacity: DEFAULT_KV_CACHE_BYTES,
            kv_tree: DEFAULT_KV_TREE.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// A default configuration rooted at `data_dir`.
    pub fn new<P: Into<PathBuf>>(data_dir: P, backend: BackendKind) -> Self {
        Self {
            data_dir: data_dir.into(),
            backend,
            ..Self::default()
        }
    }

    /// Loads the configuration from `CHRONO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary key lookup. `from_env`
    /// uses the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend = match lookup("CHRONO_BACKEND") {
            Some(v) => v.trim().parse()?,
            None => defaults.backend,
        };

        Ok(Self {
            data_dir: lookup("CHRONO_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            backend,
            read_workers: parse_or::<usize>(lookup("CHRONO_READ_WORKERS"))
                .filter(|n| *n > 0)
                .unwrap_or(defaults.read_workers),
            sync_on_flush: parse_or::<bool>(lookup("CHRONO_SYNC")).unwrap_or(defaults.sync_on_flush),
            kv_cache_capacity: parse_or::<u64>(lookup("CHRONO_KV_CACHE_MB"))
                .map(|mb| mb.saturating_mul(1024 * 1024))
                .unwrap_or(defaults.kv_cache_capacity),
            kv_tree: lookup("CHRONO_KV_TREE").unwrap_or(defaults.kv_tree),
            log_level: lookup("CHRONO_LOG").unwrap_or(defaults.log_level),
        })
    }

    /// Builder-style override of the worker pool size.
    #[must_use]
    pub fn with_read_workers(mut self, workers: usize) -> Self {
        self.read_workers = workers.max(1);
        self
    }

    /// Builder-style override of the fsync policy.
    #[must_use]
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync_on_flush = sync;
        self
    }
}

/// Parses a trimmed variable, treating an unparseable value as unset.
fn parse_or<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}
