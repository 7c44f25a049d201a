//! End-to-end checks of the `hnswdb` binary against a file-backed config.

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;

fn write_file_config(dir: &std::path::Path) -> std::path::PathBuf {
    let data_path = dir.join("data.json");
    let config_path = dir.join("config.yaml");
    fs::write(
        &config_path,
        format!(
            "storage:\n  type: file\n  file:\n    enable: true\n    path: {}\nhnsw:\n  dim: 3\n  m: 8\n  ef: 32\n",
            data_path.display(),
        ),
    )
    .unwrap();
    config_path
}

#[test]
fn demo_run_exits_successfully_and_logs_hits() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_file_config(dir.path());

    Command::cargo_bin("hnswdb")
        .unwrap()
        .args(["demo", "--config", config_path.to_str().unwrap()])
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stderr(contains("doc1"));
}

#[test]
fn search_subcommand_finds_the_inserted_demo_documents() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_file_config(dir.path());

    Command::cargo_bin("hnswdb")
        .unwrap()
        .args(["demo", "--config", config_path.to_str().unwrap()])
        .env("RUST_LOG", "error")
        .assert()
        .success();

    Command::cargo_bin("hnswdb")
        .unwrap()
        .args([
            "search",
            "Hello everyone",
            "--config",
            config_path.to_str().unwrap(),
            "--k",
            "2",
        ])
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stderr(contains("hit"));
}

#[test]
fn missing_config_file_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("does-not-exist.yaml");

    Command::cargo_bin("hnswdb")
        .unwrap()
        .args(["demo", "--config", config_path.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn unknown_storage_type_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, "storage:\n  type: mongodb\n").unwrap();

    Command::cargo_bin("hnswdb")
        .unwrap()
        .args(["demo", "--config", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("unknown storage type"));
}
