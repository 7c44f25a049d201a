//! `hnswdb` CLI bootstrap.
//!
//! Loads a configuration document (`./config.yaml` by default), opens the
//! [`Database`] facade, and either runs the built-in demo or a one-shot
//! search. `demo` mirrors `main()` in
//! `examples/original_source/main.go` — insert a handful of documents,
//! look one up, search, delete, and search again. Everything past config
//! loading and facade construction is out of scope as a contract
//! (spec.md §6); these subcommands exist only to exercise it.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hnswdb_core::config::HnswDbConfig;
use hnswdb_core::database::Database;

/// `hnswdb` - an embeddable vector database built around a hand-rolled HNSW index.
#[derive(Parser)]
#[command(name = "hnswdb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert a handful of documents, search, delete one, and search again.
    Demo {
        /// Path to the configuration document.
        #[arg(short, long, default_value = "config.yaml", env = "HNSWDB_CONFIG")]
        config: String,
    },

    /// Embed `query` with the demo's stand-in model and print the top-k hits.
    Search {
        /// Text to embed and search for.
        query: String,

        /// Path to the configuration document.
        #[arg(short, long, default_value = "config.yaml", env = "HNSWDB_CONFIG")]
        config: String,

        /// Number of hits to return.
        #[arg(short, long, default_value_t = 5)]
        k: usize,
    },
}

/// A stand-in for a real embedding model: maps text to a 3-dimensional
/// vector so the CLI has something to insert and search without pulling
/// in an actual model (spec.md §1 treats the embedding model as an opaque
/// external collaborator).
fn mock_embedding(text: &str) -> Vec<f64> {
    vec![text.len() as f64, 2.0, 3.0]
}

fn open(config_path: &str) -> anyhow::Result<Database> {
    let cfg = HnswDbConfig::load_from_path(config_path)?;
    Ok(Database::open(&cfg)?)
}

fn run_demo(config_path: &str) -> anyhow::Result<()> {
    let db = open(config_path)?;

    db.insert_from_model("doc1", mock_embedding("Hello world"), "Hello world")?;
    db.insert_from_model("doc2", mock_embedding("Hi there"), "Hi there")?;
    db.insert_from_model("doc3", mock_embedding("Good day"), "Good day")?;

    if let Some(doc) = db.get("doc1")? {
        tracing::info!(vector = ?doc.vector, meta = %doc.meta, "doc1");
    }

    let query = mock_embedding("Hello everyone");
    let results = db.search_from_model(&query, 2)?;
    tracing::info!("top 2 similar documents:");
    for res in &results {
        tracing::info!(id = %res.id, similarity = res.similarity, meta = %res.meta, "hit");
    }

    db.delete("doc2")?;
    tracing::info!("after deleting doc2:");
    let results = db.search_from_model(&query, 3)?;
    for res in &results {
        tracing::info!(id = %res.id, similarity = res.similarity, meta = %res.meta, "hit");
    }

    db.close()?;
    Ok(())
}

fn run_search(query: &str, config_path: &str, k: usize) -> anyhow::Result<()> {
    let db = open(config_path)?;
    let embedding = mock_embedding(query);
    let results = db.search_from_model(&embedding, k)?;
    for res in &results {
        tracing::info!(id = %res.id, similarity = res.similarity, meta = %res.meta, "hit");
    }
    db.close()?;
    Ok(())
}

fn run() -> anyhow::Result<()> {
    match Cli::parse().command {
        Commands::Demo { config } => run_demo(&config),
        Commands::Search { query, config, k } => run_search(&query, &config, k),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run() {
        tracing::error!(error = %err, "hnswdb failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
