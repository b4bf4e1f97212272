//! # Schema - typed record layout for ChronoStore
//!
//! Declares the ordered, fixed-width numeric columns of a table and derives
//! the binary record layout every backend stores.
//!
//! ## Record layout
//!
//! ```text
//! Schema { timestamp: int64, price: float64, volume: uint32 }
//!
//! ┌──────────────────┬──────────────────┬──────────┐
//! │ timestamp (8 B)  │ price (8 B)      │ vol (4 B)│   record_width = 20
//! └──────────────────┴──────────────────┴──────────┘
//!  offset 0           offset 8           offset 16
//! ```
//!
//! Offsets are computed once when the schema is declared. Encoding accepts a
//! single [`Row`], a list of rows, or a columnar batch ([`Columns`]) and
//! produces byte-identical output for the same data. Decoding turns a byte
//! buffer back into one typed sequence per column.
//!
//! ## Example
//!
//! ```rust
//! use schema::{Column, ColumnKind, Row, Schema};
//!
//! let schema = Schema::new(vec![
//!     Column::new("timestamp", ColumnKind::Int64),
//!     Column::new("price", ColumnKind::Float64),
//! ]).unwrap();
//!
//! let bytes = schema
//!     .encode_row(&Row::new().with("timestamp", 1i64).with("price", 100.5))
//!     .unwrap();
//! assert_eq!(bytes.len(), 16);
//!
//! let cols = schema.decode_all(&bytes).unwrap();
//! assert_eq!(cols["price"].as_f64(), Some(&[100.5][..]));
//! ```

mod codec;
mod columns;
mod error;
mod kind;
mod layout;
mod row;
mod slice;
mod value;

pub use columns::{ColumnData, Columns};
pub use error::{Result, StoreError};
pub use kind::ColumnKind;
pub use layout::{Column, FieldLayout, Schema};
pub use row::{Row, WriteBatch};
pub use slice::RowSlice;
pub use value::Value;
