//! Command-line surface tests for the `hyde` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_help_lists_server_command() {
    Command::cargo_bin("hyde")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("server"));
}

#[test]
fn test_server_help_lists_flags() {
    Command::cargo_bin("hyde")
        .unwrap()
        .args(["server", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--watch"));
}

#[test]
fn test_missing_source_fails() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("no-such-site");

    Command::cargo_bin("hyde")
        .unwrap()
        .args(["--no-color", "server", "--source"])
        .arg(&missing)
        .assert()
        .failure();
}

#[test]
fn test_invalid_port_fails() {
    Command::cargo_bin("hyde")
        .unwrap()
        .args(["server", "--port", "not-a-port"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_port_zero_rejected() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("hyde")
        .unwrap()
        .args(["--no-color", "server", "--port", "0", "--source"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));
}
