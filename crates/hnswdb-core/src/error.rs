//! Error types for `hnswdb`.
//!
//! Mirrors the teacher crate's unified-error pattern (one `thiserror` enum,
//! one `Result<T>` alias, a `#[from] std::io::Error` arm) but scoped to the
//! error kinds spec.md §7 actually names. `Get`/`Delete` of a missing id is
//! not an error — those APIs return `Option`/`()`, never a variant here.

use thiserror::Error;

/// Result type alias for `hnswdb` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `hnswdb` operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or internally inconsistent startup configuration; fatal at init.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O, parse, or driver failure from a storage backend.
    ///
    /// Surfaced to the caller of a facade mutation; the index is never
    /// updated when this is returned (spec.md §7).
    #[error("storage error: {0}")]
    Storage(String),

    /// `len(vector) != D` on insert or search.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension (`D`).
        expected: usize,
        /// Actual vector length received.
        actual: usize,
    },

    /// JSON (de)serialization failure, e.g. in the file backend or a SQL
    /// backend's vector column encoding.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Transparent I/O passthrough, mainly for the file backend.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<postgres::Error> for Error {
    fn from(err: postgres::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
