//! Embedded SQL storage backend.
//!
//! Named `duckdb` for the config key the system this was ported from
//! uses (`storage.duckdb.*`), but — exactly like that system — it is not
//! actually DuckDB: `examples/original_source/storage/duckdb.go` opens
//! `"sqlite3"` via `database/sql` and the `go-sqlite3` driver. This port
//! keeps that mismatch intentionally and runs bundled SQLite through
//! `rusqlite` (see DESIGN.md).

use std::collections::HashMap;

use rusqlite::Connection;

use super::{Storage, VectorDoc};
use crate::error::Result;

/// SQLite-backed storage, despite the name.
pub struct DuckDbStorage {
    conn: Connection,
}

impl DuckDbStorage {
    /// Opens (creating if necessary) the database file at `path` and
    /// ensures the `vectors` table exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the table cannot
    /// be created.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS vectors (id TEXT PRIMARY KEY, vector BLOB, meta TEXT)",
            [],
        )?;
        Ok(Self { conn })
    }

    /// Opens an in-memory database, for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS vectors (id TEXT PRIMARY KEY, vector BLOB, meta TEXT)",
            [],
        )?;
        Ok(Self { conn })
    }
}

impl Storage for DuckDbStorage {
    fn load(&self) -> Result<HashMap<String, VectorDoc>> {
        let mut stmt = self.conn.prepare("SELECT id, vector, meta FROM vectors")?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let vector_blob: Vec<u8> = row.get(1)?;
            let meta: String = row.get(2)?;
            Ok((id, vector_blob, meta))
        })?;

        let mut data = HashMap::new();
        for row in rows {
            let (id, vector_blob, meta) = row?;
            let vector: Vec<f64> = serde_json::from_slice(&vector_blob)?;
            data.insert(id, VectorDoc::new(vector, meta));
        }
        Ok(data)
    }

    fn save(&mut self, data: &HashMap<String, VectorDoc>) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO vectors (id, vector, meta) VALUES (?1, ?2, ?3)")?;
            for (id, doc) in data {
                let vector_blob = serde_json::to_vec(&doc.vector)?;
                stmt.execute(rusqlite::params![id, vector_blob, doc.meta])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn insert(&mut self, id: &str, doc: VectorDoc) -> Result<()> {
        let vector_blob = serde_json::to_vec(&doc.vector)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO vectors (id, vector, meta) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, vector_blob, doc.meta],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<VectorDoc>> {
        let result = self.conn.query_row(
            "SELECT vector, meta FROM vectors WHERE id = ?1",
            [id],
            |row| {
                let vector_blob: Vec<u8> = row.get(0)?;
                let meta: String = row.get(1)?;
                Ok((vector_blob, meta))
            },
        );

        match result {
            Ok((vector_blob, meta)) => {
                let vector: Vec<f64> = serde_json::from_slice(&vector_blob)?;
                Ok(Some(VectorDoc::new(vector, meta)))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM vectors WHERE id = ?1", [id])?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
