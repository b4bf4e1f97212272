use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use schema::{Columns, RowSlice, Schema};

/// Read-only view of a partition log.
///
/// The file is memory-mapped once on [`open`](Self::open) and decoded
/// directly from the mapping; the mapping is released when the reader is
/// dropped. Empty files are not mapped at all (zero-length mappings are not
/// portable).
pub struct LogReader {
    path: PathBuf,
    mmap: Option<Mmap>,
}

impl LogReader {
    /// Maps the log at `path`. Returns `Ok(None)` if the file does not exist,
    /// which callers treat as an empty partition.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Option<Self>> {
        let path = path.as_ref().to_path_buf();
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let len = file.metadata()?.len();
        let mmap = if len == 0 {
            None
        } else {
            // SAFETY: the map is read-only. Appends from this process only
            // grow the file past the mapped length; truncating or rewriting
            // a log from another process while it is mapped is outside the
            // engine's single-writer contract.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Some(Self { path, mmap }))
    }

    /// The mapped bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of whole records of `record_width` bytes.
    #[must_use]
    pub fn row_count(&self, record_width: usize) -> usize {
        self.len() / record_width
    }

    /// Decodes the rows selected by `slice`.
    pub fn decode(&self, schema: &Schema, slice: RowSlice) -> schema::Result<Columns> {
        schema.decode_rows(self.bytes(), slice)
    }

    /// Decodes every row.
    pub fn decode_all(&self, schema: &Schema) -> schema::Result<Columns> {
        self.decode(schema, RowSlice::ALL)
    }
}

impl std::fmt::Debug for LogReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogReader")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}
