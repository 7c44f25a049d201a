//! Configuration loading for `hnswdb`.
//!
//! Layered via `figment` the way the teacher crate loads `velesdb.toml`
//! (defaults < file < environment), but the file format is YAML, not
//! TOML: this crate's on-disk contract is `config.yaml`, matching the
//! system it was ported from (which reads it with `gopkg.in/yaml.v2`).
//! Validation and error wording mirror that original's `LoadConfig`
//! switch statement — storage type is checked against the known set
//! first, then whether the selected backend is enabled.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file couldn't be read or didn't parse as YAML.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// The configuration parsed fine but failed validation.
    #[error("{0}")]
    InvalidValue(String),
}

/// `storage.file` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileStorageConfig {
    pub enable: bool,
    pub path: String,
}

/// `storage.duckdb` section.
///
/// Named for the config key the original system uses, even though the
/// backend behind it is plain embedded SQL (see `storage::duckdb` and
/// DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DuckDbStorageConfig {
    pub enable: bool,
    pub path: String,
}

/// `storage.postgres` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresStorageConfig {
    pub enable: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for PostgresStorageConfig {
    fn default() -> Self {
        Self {
            enable: false,
            host: "localhost".to_string(),
            port: 5432,
            user: String::new(),
            password: String::new(),
            database: String::new(),
        }
    }
}

/// `storage` section: which backend is active, plus each backend's settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// One of `"file"`, `"duckdb"`, `"postgres"`.
    #[serde(rename = "type")]
    pub storage_type: String,
    pub file: FileStorageConfig,
    pub duckdb: DuckDbStorageConfig,
    pub postgres: PostgresStorageConfig,
}

/// `hnsw` section: fixed at index-construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswConfig {
    pub dim: usize,
    pub m: usize,
    pub ef: usize,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            dim: 0,
            m: 16,
            ef: 64,
        }
    }
}

/// Top-level `hnswdb` configuration, loaded from `config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HnswDbConfig {
    pub storage: StorageConfig,
    pub hnsw: HnswConfig,
}

impl HnswDbConfig {
    /// Loads `./config.yaml`, merged over defaults and `HNSWDB_`-prefixed
    /// environment overrides, then validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if the file is present but
    /// malformed, or [`ConfigError::InvalidValue`] if the parsed
    /// configuration fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.yaml")
    }

    /// Loads configuration from a specific path.
    ///
    /// # Errors
    ///
    /// See [`HnswDbConfig::load`].
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("HNSWDB_").split("_").lowercase(false));

        let cfg: Self = figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parses configuration from a YAML string, for tests.
    ///
    /// # Errors
    ///
    /// See [`HnswDbConfig::load`].
    pub fn from_yaml(yaml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::string(yaml_str));

        let cfg: Self = figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates the selected storage type is both recognized and enabled.
    ///
    /// Checks type recognition before the enabled flag, matching the
    /// system this was ported from.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] with one of the two exact
    /// messages the original produces: `"<type> storage is specified but
    /// not enabled"` or `"unknown storage type: <value>"`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.storage.storage_type.as_str() {
            "file" => {
                if !self.storage.file.enable {
                    return Err(ConfigError::InvalidValue(
                        "file storage is specified but not enabled".to_string(),
                    ));
                }
            }
            "duckdb" => {
                if !self.storage.duckdb.enable {
                    return Err(ConfigError::InvalidValue(
                        "duckdb storage is specified but not enabled".to_string(),
                    ));
                }
            }
            "postgres" => {
                if !self.storage.postgres.enable {
                    return Err(ConfigError::InvalidValue(
                        "postgres storage is specified but not enabled".to_string(),
                    ));
                }
            }
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "unknown storage type: {other}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_minimal_file_config() {
        let cfg = HnswDbConfig::from_yaml(
            r#"
storage:
  type: file
  file:
    enable: true
    path: ./data.json
hnsw:
  dim: 3
  m: 16
  ef: 64
"#,
        )
        .unwrap();
        assert_eq!(cfg.storage.storage_type, "file");
        assert!(cfg.storage.file.enable);
        assert_eq!(cfg.hnsw.dim, 3);
    }

    #[test]
    fn rejects_unrecognized_storage_type() {
        let err = HnswDbConfig::from_yaml("storage:\n  type: mongodb\n").unwrap_err();
        match err {
            ConfigError::InvalidValue(msg) => {
                assert_eq!(msg, "unknown storage type: mongodb");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn rejects_recognized_but_disabled_backend() {
        let err = HnswDbConfig::from_yaml(
            r#"
storage:
  type: duckdb
  duckdb:
    enable: false
"#,
        )
        .unwrap_err();
        match err {
            ConfigError::InvalidValue(msg) => {
                assert_eq!(msg, "duckdb storage is specified but not enabled");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn postgres_backend_reads_full_connection_settings() {
        let cfg = HnswDbConfig::from_yaml(
            r#"
storage:
  type: postgres
  postgres:
    enable: true
    host: db.internal
    port: 5433
    user: hnsw
    password: secret
    database: vectors
hnsw:
  dim: 8
  m: 12
  ef: 100
"#,
        )
        .unwrap();
        assert_eq!(cfg.storage.postgres.host, "db.internal");
        assert_eq!(cfg.storage.postgres.port, 5433);
        assert_eq!(cfg.storage.postgres.database, "vectors");
    }

    #[test]
    fn env_override_takes_precedence_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
storage:
  type: file
  file:
    enable: true
    path: ./data.json
hnsw:
  dim: 4
  m: 16
  ef: 64
"#,
        )
        .unwrap();

        std::env::set_var("HNSWDB_HNSW_M", "99");
        let cfg = HnswDbConfig::load_from_path(&path).unwrap();
        std::env::remove_var("HNSWDB_HNSW_M");
        assert_eq!(cfg.hnsw.m, 99);
    }
}
