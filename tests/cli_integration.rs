//! End-to-end tests for CLI commands using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn covidash_cmd() -> Command {
    Command::cargo_bin("covidash").unwrap()
}

#[test]
fn test_version_output() {
    covidash_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("covidash"));
}

#[test]
fn test_help_shows_all_commands() {
    covidash_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("areas"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_serve_help() {
    covidash_cmd()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--data-dir"))
        .stdout(predicate::str::contains("--no-refresh"));
}

#[test]
fn test_fetch_help() {
    covidash_cmd()
        .args(["fetch", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--only"))
        .stdout(predicate::str::contains("--start-date"))
        .stdout(predicate::str::contains("--force"));
}

#[test]
fn test_areas_lists_regions_then_italy() {
    covidash_cmd()
        .args(["areas", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Abruzzo\""))
        .stdout(predicate::str::contains("\"P.A. Bolzano\""))
        .stdout(predicate::str::contains("\"Italia\""));
}

#[test]
fn test_fetch_rejects_reversed_date_range() {
    let temp_dir = TempDir::new().unwrap();
    covidash_cmd()
        .current_dir(temp_dir.path())
        .args([
            "fetch",
            "--only",
            "contagions",
            "--start-date",
            "2021-03-10",
            "--end-date",
            "2021-03-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_fetch_rejects_start_date_in_the_future() {
    let temp_dir = TempDir::new().unwrap();
    covidash_cmd()
        .current_dir(temp_dir.path())
        .args(["fetch", "--only", "contagions", "--start-date", "2099-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("start date 2099-01-01 is after end date"));

    assert!(!temp_dir.path().join("share").exists());
}

#[test]
fn test_config_init_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("covidash.toml");

    covidash_cmd()
        .args(["config", "init", "-o"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file created"));

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("port = 8501"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("covidash.toml");
    std::fs::write(&config_path, "existing").unwrap();

    covidash_cmd()
        .args(["config", "init", "-o"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_completions_bash() {
    covidash_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("covidash"));
}

#[test]
fn test_serve_rejects_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("covidash.toml");
    std::fs::write(&config_path, "[dashboard]\ndefault_area = \"Atlantide\"\n").unwrap();

    covidash_cmd()
        .args(["serve", "--no-refresh", "-c"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("default_area"));
}
