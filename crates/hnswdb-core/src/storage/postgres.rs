//! Networked Postgres storage backend.
//!
//! Ground: `examples/original_source/storage/postgres.go` — same
//! `(id, vector, meta)` schema as the embedded backend, but `vector` is
//! `JSONB` and upserts use `ON CONFLICT ... DO UPDATE` rather than
//! SQLite's `INSERT OR REPLACE`.

use std::collections::HashMap;

use parking_lot::Mutex;
use postgres::{Client, NoTls};

use super::{Storage, VectorDoc};
use crate::error::Result;

/// Connection settings for [`PostgresStorage::connect`].
#[derive(Debug, Clone)]
pub struct PostgresConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Postgres-backed storage, connected over a plaintext TCP socket (no TLS).
///
/// `postgres::Client`'s query methods all take `&mut self` (one
/// synchronous connection, no internal locking), so the client is wrapped
/// in a `Mutex` here purely to let `load`/`get` satisfy the `Storage`
/// trait's `&self` signature.
pub struct PostgresStorage {
    client: Mutex<Client>,
}

impl PostgresStorage {
    /// Connects and ensures the `vectors` table exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or table creation fails.
    pub fn connect(params: &PostgresConnectionParams) -> Result<Self> {
        let conn_str = format!(
            "host={} port={} user={} password={} dbname={} sslmode=disable",
            params.host, params.port, params.user, params.password, params.database
        );
        let mut client = Client::connect(&conn_str, NoTls)?;
        client.execute(
            "CREATE TABLE IF NOT EXISTS vectors (id TEXT PRIMARY KEY, vector JSONB, meta TEXT)",
            &[],
        )?;
        Ok(Self {
            client: Mutex::new(client),
        })
    }
}

impl Storage for PostgresStorage {
    fn load(&self) -> Result<HashMap<String, VectorDoc>> {
        let rows = self
            .client
            .lock()
            .query("SELECT id, vector, meta FROM vectors", &[])?;

        let mut data = HashMap::new();
        for row in rows {
            let id: String = row.get(0);
            let vector_json: serde_json::Value = row.get(1);
            let meta: String = row.get(2);
            let vector: Vec<f64> = serde_json::from_value(vector_json)?;
            data.insert(id, VectorDoc::new(vector, meta));
        }
        Ok(data)
    }

    fn save(&mut self, data: &HashMap<String, VectorDoc>) -> Result<()> {
        let mut client = self.client.lock();
        let mut tx = client.transaction()?;
        for (id, doc) in data {
            let vector_json = serde_json::to_value(&doc.vector)?;
            tx.execute(
                "INSERT INTO vectors (id, vector, meta) VALUES ($1, $2, $3) \
                 ON CONFLICT (id) DO UPDATE SET vector = $2, meta = $3",
                &[id, &vector_json, &doc.meta],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn insert(&mut self, id: &str, doc: VectorDoc) -> Result<()> {
        let vector_json = serde_json::to_value(&doc.vector)?;
        self.client.lock().execute(
            "INSERT INTO vectors (id, vector, meta) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET vector = $2, meta = $3",
            &[&id, &vector_json, &doc.meta],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<VectorDoc>> {
        let row = self
            .client
            .lock()
            .query_opt("SELECT vector, meta FROM vectors WHERE id = $1", &[&id])?;

        match row {
            Some(row) => {
                let vector_json: serde_json::Value = row.get(0);
                let meta: String = row.get(1);
                let vector: Vec<f64> = serde_json::from_value(vector_json)?;
                Ok(Some(VectorDoc::new(vector, meta)))
            }
            None => Ok(None),
        }
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        self.client
            .lock()
            .execute("DELETE FROM vectors WHERE id = $1", &[&id])?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

// No inline tests here: exercising this backend needs a live Postgres
// server, which isn't available in this workspace's test environment.
// See DESIGN.md for how this is covered instead.
