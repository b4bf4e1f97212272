//! Error type shared by every ChronoStore crate.
//!
//! The backends and the engine return `anyhow::Result`; callers that need to
//! branch on the failure class recover it with
//! `err.downcast_ref::<StoreError>()`.

use thiserror::Error;

/// A convenience `Result` type for schema and codec operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// The error taxonomy of the storage engine.
///
/// A missing partition is deliberately absent from this list: reading a day
/// that was never written is an empty result, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Invalid column declaration (duplicate or empty name, unknown kind).
    #[error("schema error: {0}")]
    Schema(String),

    /// A row or batch cannot be encoded under the schema.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Stored bytes are not a whole number of records.
    #[error("corrupt partition: {len} bytes is not a multiple of the {width}-byte record width")]
    Corruption {
        /// Length of the stored byte buffer.
        len: usize,
        /// Record width declared by the schema.
        width: usize,
    },

    /// Malformed date, inverted date range, or unusable table name.
    #[error("validation error: {0}")]
    Validation(String),

    /// The `where` predicate returned a mask of the wrong length.
    #[error("filter mask has {actual} entries but the result has {expected} rows")]
    FilterShape {
        /// Number of rows in the assembled result.
        expected: usize,
        /// Number of entries in the returned mask.
        actual: usize,
    },
}
