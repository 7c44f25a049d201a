//! JSON-file storage backend.
//!
//! Ground: `examples/original_source/storage/file.go` — full-rewrite
//! on every mutation, two-space-indented JSON, "file absent" treated as
//! "empty map" rather than an error.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;

use super::{Storage, VectorDoc};
use crate::error::Result;

/// Stores the whole dataset as one pretty-printed JSON object.
///
/// `data` is cached behind a `RwLock` (rather than plain field access)
/// purely so `load`/`get` can be `&self`: the file itself is still the
/// single source of truth, rewritten whole on every mutation.
pub struct FileStorage {
    path: PathBuf,
    data: RwLock<HashMap<String, VectorDoc>>,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: RwLock::new(HashMap::new()),
        }
    }

    fn write_pretty(path: &Path, data: &HashMap<String, VectorDoc>) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"  ");
        let mut ser = Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(data, &mut ser)?;
        fs::write(path, buf)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn load(&self) -> Result<HashMap<String, VectorDoc>> {
        if !self.path.exists() {
            return Ok(self.data.read().clone());
        }
        let bytes = fs::read(&self.path)?;
        let loaded: HashMap<String, VectorDoc> = serde_json::from_slice(&bytes)?;
        *self.data.write() = loaded.clone();
        Ok(loaded)
    }

    fn save(&mut self, data: &HashMap<String, VectorDoc>) -> Result<()> {
        *self.data.write() = data.clone();
        Self::write_pretty(&self.path, data)
    }

    fn insert(&mut self, id: &str, doc: VectorDoc) -> Result<()> {
        let snapshot = {
            let mut guard = self.data.write();
            guard.insert(id.to_string(), doc);
            guard.clone()
        };
        Self::write_pretty(&self.path, &snapshot)
    }

    fn get(&self, id: &str) -> Result<Option<VectorDoc>> {
        Ok(self.data.read().get(id).cloned())
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let snapshot = {
            let mut guard = self.data.write();
            guard.remove(id);
            guard.clone()
        };
        Self::write_pretty(&self.path, &snapshot)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
