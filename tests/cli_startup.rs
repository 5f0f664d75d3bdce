//! Startup validation behavior of the `replisync` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn missing_source_directory_fails_before_the_loop() {
    let temp = tempdir().expect("tempdir");
    let missing = temp.path().join("absent");
    let replica = temp.path().join("replica");

    Command::cargo_bin("replisync")
        .expect("binary under test")
        .arg(&missing)
        .arg(&replica)
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("not an accessible directory"));

    assert!(!replica.exists(), "no pass may run after a startup failure");
}

#[test]
fn source_path_naming_a_file_fails_before_the_loop() {
    let temp = tempdir().expect("tempdir");
    let source_file = temp.path().join("source.txt");
    fs::write(&source_file, b"not a directory").expect("write file");

    Command::cargo_bin("replisync")
        .expect("binary under test")
        .arg(&source_file)
        .arg(temp.path().join("replica"))
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("not an accessible directory"));
}

#[test]
fn zero_interval_is_a_startup_error() {
    let temp = tempdir().expect("tempdir");
    let source = temp.path().join("source");
    fs::create_dir(&source).expect("create source");

    Command::cargo_bin("replisync")
        .expect("binary under test")
        .arg(&source)
        .arg(temp.path().join("replica"))
        .args(["--interval_seconds", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive number of seconds"));
}

#[test]
fn negative_interval_is_a_startup_error() {
    let temp = tempdir().expect("tempdir");
    let source = temp.path().join("source");
    fs::create_dir(&source).expect("create source");

    Command::cargo_bin("replisync")
        .expect("binary under test")
        .arg(&source)
        .arg(temp.path().join("replica"))
        .args(["-i", "-1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive number of seconds"));
}

#[test]
fn non_numeric_interval_is_a_startup_error() {
    let temp = tempdir().expect("tempdir");
    let source = temp.path().join("source");
    fs::create_dir(&source).expect("create source");

    Command::cargo_bin("replisync")
        .expect("binary under test")
        .arg(&source)
        .arg(temp.path().join("replica"))
        .args(["-i", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a number of seconds"));
}

#[test]
fn help_describes_the_cli_surface() {
    Command::cargo_bin("replisync")
        .expect("binary under test")
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--interval_seconds")
                .and(predicate::str::contains("--log_path"))
                .and(predicate::str::contains("SOURCE"))
                .and(predicate::str::contains("REPLICA")),
        );
}
