use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::trace;

/// Default capacity of the in-process write buffer (256 KiB).
pub const DEFAULT_BUFFER_BYTES: usize = 256 * 1024;

/// Append-only writer for one partition log.
///
/// Bytes go through a `BufWriter`, so an append is usually just a memcpy.
/// Nothing is visible to readers of the file until [`flush`](Self::flush)
/// (or drop) pushes the buffer to the OS; durability additionally needs
/// `flush(true)`.
pub struct LogWriter {
    path: PathBuf,
    file: BufWriter<File>,
    /// Bytes accepted since the writer was opened.
    written: u64,
}

impl LogWriter {
    /// Opens (or creates) a log file in append mode. The parent directory
    /// must already exist.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Self::with_capacity(path, DEFAULT_BUFFER_BYTES)
    }

    /// Like [`open`](Self::open) with a custom buffer size.
    pub fn with_capacity<P: AsRef<Path>>(path: P, capacity: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: BufWriter::with_capacity(capacity, file),
            written: 0,
        })
    }

    /// Writes `bytes` at the current end of the file.
    ///
    /// `bytes` should be whole encoded records; the writer does not look at
    /// them.
    pub fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)?;
        self.written += bytes.len() as u64;
        trace!(path = %self.path.display(), bytes = bytes.len(), "log append");
        Ok(())
    }

    /// Pushes buffered bytes to the file and, when `sync` is set, forces them
    /// to stable storage with `sync_all()`.
    pub fn flush(&mut self, sync: bool) -> io::Result<()> {
        self.file.flush()?;
        if sync {
            self.file.get_ref().sync_all()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes appended through this handle (buffered or not).
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.written
    }
}

impl std::fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogWriter")
            .field("path", &self.path)
            .field("bytes_written", &self.written)
            .field("buffered", &self.file.buffer().len())
            .finish()
    }
}
