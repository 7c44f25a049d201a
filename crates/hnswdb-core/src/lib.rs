//! # `hnswdb` core
//!
//! An embeddable vector database built around a hand-rolled HNSW
//! (Hierarchical Navigable Small World) index. Documents are keyed by a
//! string id and carry a fixed-dimensional `f64` embedding plus an opaque
//! metadata string; queries rank by cosine similarity.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use hnswdb_core::config::HnswDbConfig;
//! use hnswdb_core::database::Database;
//!
//! let cfg = HnswDbConfig::load()?;
//! let db = Database::open(&cfg)?;
//!
//! db.insert_from_model("doc-1", vec![0.1, 0.2, 0.3], "hello world")?;
//! let hits = db.search_from_model(&[0.1, 0.2, 0.3], 10)?;
//! ```
//!
//! ## Layout
//!
//! - [`index`] — the HNSW graph: insert, delete, search.
//! - [`node`] — the per-vector record and its per-layer neighbor lists.
//! - [`distance`] — the cosine similarity kernel.
//! - [`rng`] — the pluggable, seedable layer-assignment PRNG.
//! - [`storage`] — the `Storage` trait and its three backends.
//! - [`database`] — the facade composing one storage backend with one index.
//! - [`config`] — `config.yaml` loading and validation.
//! - [`error`] — the crate-wide error type.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod database;
pub mod distance;
pub mod error;
pub mod index;
pub mod node;
pub mod rng;
pub mod storage;

pub use config::HnswDbConfig;
pub use database::{Database, SearchResult};
pub use error::{Error, Result};
pub use index::HnswIndex;
pub use node::{Neighbor, Node};
