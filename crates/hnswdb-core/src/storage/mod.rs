//! Pluggable persistence backends behind a single [`Storage`] trait.
//!
//! Three backends ship: [`file::FileStorage`] (JSON on disk),
//! [`duckdb::DuckDbStorage`] (embedded SQL via `rusqlite`), and
//! [`postgres::PostgresStorage`] (networked SQL). All three implement the
//! same four-column contract the system this was ported from used:
//! id, vector, and an opaque metadata string, with whole-map `load`/`save`
//! plus per-id `insert`/`get`/`delete`.

pub mod duckdb;
pub mod file;
pub mod postgres;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A stored vector plus caller-opaque metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDoc {
    pub vector: Vec<f64>,
    pub meta: String,
}

impl VectorDoc {
    #[must_use]
    pub fn new(vector: Vec<f64>, meta: impl Into<String>) -> Self {
        Self {
            vector,
            meta: meta.into(),
        }
    }
}

/// A persistence backend for `(id, vector, meta)` triples.
///
/// Implementors own whatever connection/file handle they need; `close`
/// releases it explicitly rather than relying solely on `Drop`, mirroring
/// the `defer db.storage.Close()` shutdown the system this was ported
/// from uses.
pub trait Storage: Send + Sync {
    /// Loads every stored document, keyed by id.
    ///
    /// Takes `&self` so a facade can hold only a read lock while hydrating
    /// search hits alongside other concurrent readers (spec.md §5).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self) -> Result<HashMap<String, VectorDoc>>;

    /// Overwrites the entire backend with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn save(&mut self, data: &HashMap<String, VectorDoc>) -> Result<()>;

    /// Upserts a single document.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn insert(&mut self, id: &str, doc: VectorDoc) -> Result<()>;

    /// Fetches a single document, or `None` if absent. Absence is not an
    /// error.
    ///
    /// Takes `&self`, for the same reason as [`Storage::load`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, id: &str) -> Result<Option<VectorDoc>>;

    /// Removes a single document. Removing an absent id is a no-op, not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn delete(&mut self, id: &str) -> Result<()>;

    /// Releases any underlying resources (file handle, connection).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to close cleanly.
    fn close(&mut self) -> Result<()>;
}
