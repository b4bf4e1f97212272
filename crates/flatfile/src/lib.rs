//! # FlatFile - append-only partition logs
//!
//! The on-disk half of the flat-file backend. Each partition is one file of
//! raw, back-to-back fixed-width records:
//!
//! ```text
//! data.bin:  [record 0][record 1][record 2] ...
//! ```
//!
//! There is no header, footer, length prefix or checksum; the record width
//! comes entirely from the [`schema::Schema`] supplied by the caller.
//!
//! - [`LogWriter`] appends encoded bytes to the end of the file through a
//!   buffered handle, and makes them durable on [`LogWriter::flush`].
//! - [`LogReader`] memory-maps the file read-only and decodes it straight
//!   from the mapping into columns.
//!
//! A crash in the middle of an append can leave a truncated tail record.
//! Nothing here repairs it; the reader reports it as
//! [`StoreError::Corruption`](schema::StoreError::Corruption).
//!
//! ## Example
//!
//! ```rust,no_run
//! use flatfile::{LogReader, LogWriter};
//! use schema::{Row, Schema};
//!
//! let schema = Schema::parse("timestamp:int64,price:float64").unwrap();
//! let bytes = schema
//!     .encode_row(&Row::new().with("timestamp", 1i64).with("price", 2.0))
//!     .unwrap();
//!
//! let mut w = LogWriter::open("data.bin").unwrap();
//! w.append(&bytes).unwrap();
//! w.flush(true).unwrap();
//! drop(w);
//!
//! let reader = LogReader::open("data.bin").unwrap().expect("file exists");
//! let cols = reader.decode_all(&schema).unwrap();
//! assert_eq!(cols.row_count(), 1);
//! ```

mod reader;
mod writer;

pub use reader::LogReader;
pub use writer::LogWriter;
