//! The vector database facade: one storage backend plus one HNSW index,
//! kept in sync behind a single lock.
//!
//! Ground: `examples/original_source/main.go`'s `VectorDB` — same
//! storage-then-index mutation order on every write, same "skip rows the
//! index points at but storage no longer has" tolerance on search.

use parking_lot::RwLock;

use crate::config::HnswDbConfig;
use crate::error::{Error, Result};
use crate::index::HnswIndex;
use crate::storage::duckdb::DuckDbStorage;
use crate::storage::file::FileStorage;
use crate::storage::postgres::{PostgresConnectionParams, PostgresStorage};
use crate::storage::{Storage, VectorDoc};

/// A search hit enriched with the metadata stored alongside its vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub similarity: f64,
    pub meta: String,
}

struct Inner {
    storage: Box<dyn Storage>,
}

/// Embeddable vector database: owns one storage backend and one HNSW
/// index, and keeps them consistent.
///
/// All mutation goes through one `parking_lot::RwLock` around the
/// storage handle, held exclusively for the duration of a write; the
/// index has its own internal lock (spec.md §5). Reads (`get` and the
/// storage-hydration half of `search_from_model`) take that same lock in
/// shared mode, so concurrent readers never block each other — only a
/// writer excludes them. Writes always touch storage before the index,
/// so a crash between the two leaves storage — the durable side —
/// correct; a reader can briefly see an index entry whose storage row is
/// already gone, which `search` tolerates by skipping it rather than
/// erroring.
pub struct Database {
    inner: RwLock<Inner>,
    index: HnswIndex,
}

impl Database {
    /// Opens a database from a loaded configuration: selects and opens
    /// the enabled storage backend, loads its contents, and replays them
    /// into a fresh HNSW index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the backend can't be opened or read,
    /// or [`Error::DimensionMismatch`] if a stored vector's length
    /// doesn't match `cfg.hnsw.dim`.
    pub fn open(cfg: &HnswDbConfig) -> Result<Self> {
        let storage: Box<dyn Storage> = match cfg.storage.storage_type.as_str() {
            "file" => Box::new(FileStorage::new(cfg.storage.file.path.clone())),
            "duckdb" => Box::new(DuckDbStorage::open(&cfg.storage.duckdb.path)?),
            "postgres" => {
                let p = &cfg.storage.postgres;
                Box::new(PostgresStorage::connect(&PostgresConnectionParams {
                    host: p.host.clone(),
                    port: p.port,
                    user: p.user.clone(),
                    password: p.password.clone(),
                    database: p.database.clone(),
                })?)
            }
            other => {
                return Err(Error::Config(format!("unknown storage type: {other}")));
            }
        };

        let data = storage.load()?;
        let index = HnswIndex::new(cfg.hnsw.dim, cfg.hnsw.m, cfg.hnsw.ef);
        for (id, doc) in &data {
            index.insert(id.clone(), doc.vector.clone())?;
        }

        tracing::info!(
            storage = %cfg.storage.storage_type,
            loaded = data.len(),
            "database opened"
        );

        Ok(Self {
            inner: RwLock::new(Inner { storage }),
            index,
        })
    }

    /// Inserts or replaces a document: writes storage first, then the
    /// index. If the storage write fails, the index is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the write fails, or
    /// [`Error::DimensionMismatch`] if `embedding.len() != self.dim()`.
    pub fn insert_from_model(
        &self,
        id: impl Into<String>,
        embedding: Vec<f64>,
        meta: impl Into<String>,
    ) -> Result<()> {
        let id = id.into();
        if embedding.len() != self.index.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.index.dim(),
                actual: embedding.len(),
            });
        }

        let mut inner = self.inner.write();
        inner
            .storage
            .insert(&id, VectorDoc::new(embedding.clone(), meta))?;
        self.index.insert(id, embedding)?;
        Ok(())
    }

    /// Fetches a document by id. Absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the backend fails to read.
    pub fn get(&self, id: &str) -> Result<Option<VectorDoc>> {
        self.inner.read().storage.get(id)
    }

    /// Deletes a document: removes it from storage first, then the
    /// index. Deleting an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the backend fails to write.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write();
        inner.storage.delete(id)?;
        self.index.delete(id);
        Ok(())
    }

    /// Searches the index for the `limit` nearest neighbors of
    /// `query_embedding`, enriched with each hit's stored metadata.
    ///
    /// A hit the index returns but storage no longer has (a narrow race
    /// between a concurrent delete and this search) is silently skipped
    /// rather than surfaced as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if
    /// `query_embedding.len() != self.dim()`.
    pub fn search_from_model(
        &self,
        query_embedding: &[f64],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let neighbors = self.index.search(query_embedding, limit)?;

        let inner = self.inner.read();
        let mut results = Vec::with_capacity(neighbors.len());
        for n in neighbors {
            if let Some(doc) = inner.storage.get(&n.id)? {
                results.push(SearchResult {
                    id: n.id,
                    similarity: n.similarity,
                    meta: doc.meta,
                });
            }
        }
        Ok(results)
    }

    /// Releases the storage backend's underlying resources.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the backend fails to close cleanly.
    pub fn close(&self) -> Result<()> {
        self.inner.write().storage.close()
    }

    /// Configured vector dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.index.dim()
    }

    /// Number of live vectors in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if the index holds no vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
