//! Integration tests for the Microscopium CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get the microscopium binary, isolated from the caller's environment
#[allow(deprecated)]
fn microscopium_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("microscopium").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("MICROSCOPIUM_CONFIG_FILE")
        .env_remove("MICROSCOPIUM_PROFILE")
        .env_remove("MONGO_URL")
        .env_remove("MONGO_DBNAME")
        .env_remove("MONGO_USER")
        .env_remove("MONGO_PASSWORD")
        .env_remove("MINIFY_HTML");
    cmd
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    microscopium_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Microscopium"))
        .stdout(predicate::str::contains("Usage: microscopium <COMMAND>"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    microscopium_cmd(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_serve_help() {
    let dir = TempDir::new().unwrap();
    microscopium_cmd(&dir)
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Run the web server"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--minify-html"))
        .stdout(predicate::str::contains("--mongo-url"))
        .stdout(predicate::str::contains("--fixtures"));
}

#[test]
fn test_check_help() {
    let dir = TempDir::new().unwrap();
    microscopium_cmd(&dir)
        .args(["check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Check the database connection"))
        .stdout(predicate::str::contains("--database"));
}

#[test]
fn test_production_requires_database_name() {
    let dir = TempDir::new().unwrap();
    microscopium_cmd(&dir)
        .args(["check", "--profile", "production"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No database name configured"));
}

#[test]
fn test_production_database_from_config_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("microscopium.toml"),
        "profile = \"production\"\n\n[database]\npassword = \"secret\"\nname = \"screens\"\n",
    )
    .unwrap();

    // The file is found and parsed: the failure is about the credentials, not the name.
    microscopium_cmd(&dir)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("password was given without a user name"));
}

#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.toml"), "[server\nport = 1").unwrap();

    microscopium_cmd(&dir)
        .args(["serve", "--config", "broken.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse TOML"));
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    microscopium_cmd(&dir)
        .args(["serve", "--config", "nowhere.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_invalid_profile() {
    let dir = TempDir::new().unwrap();
    microscopium_cmd(&dir)
        .args(["serve", "--profile", "staging"])
        .assert()
        .failure();
}

#[test]
fn test_serve_missing_fixtures_dir() {
    let dir = TempDir::new().unwrap();
    microscopium_cmd(&dir)
        .args(["serve", "--fixtures", "no-such-dir", "--port", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Database error"));
}
