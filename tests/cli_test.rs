/// CLI binary integration tests using assert_cmd
///
/// Each test points SAVEKEEPER_DATA_DIR at a fresh temp directory.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

fn savekeeper(data_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_savekeeper"));
    cmd.env("SAVEKEEPER_DATA_DIR", data_dir);
    cmd
}

/// Data dir with a configured source directory holding one save file
fn configured_home() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("saves");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("global-v35"), b"day 100").unwrap();
    fs::write(source.join("steam_autocloud.vdf"), b"cloud").unwrap();

    savekeeper(temp.path())
        .args(["config", "set", "source", source.to_str().unwrap()])
        .assert()
        .success();

    (temp, source)
}

#[test]
fn test_cli_no_command_shows_hint() {
    let temp = TempDir::new().unwrap();
    savekeeper(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("savekeeper --help"));
}

#[test]
fn test_cli_capture_and_list() {
    let (temp, _source) = configured_home();

    savekeeper(temp.path())
        .arg("capture")
        .assert()
        .success()
        .stdout(predicate::str::contains("Captured 1 file(s)"));

    savekeeper(temp.path())
        .args(["list", "--long"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 backup(s)"))
        .stdout(predicate::str::contains("global-v35"));

    let backups = temp.path().join("backups");
    let days: Vec<_> = fs::read_dir(&backups).unwrap().collect();
    assert_eq!(days.len(), 1);
}

#[test]
fn test_cli_capture_without_source_is_invalid_configuration() {
    let temp = TempDir::new().unwrap();
    savekeeper(temp.path())
        .args(["config", "set", "archive", temp.path().join("a").to_str().unwrap()])
        .assert()
        .success();

    // no source directory configured on non-Windows hosts
    if cfg!(not(windows)) {
        savekeeper(temp.path())
            .arg("capture")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}

#[test]
fn test_cli_non_numeric_interval_rejected() {
    let (temp, _source) = configured_home();

    savekeeper(temp.path())
        .args(["config", "set", "interval", "often"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_cli_restore_requires_force() {
    let (temp, source) = configured_home();
    savekeeper(temp.path()).arg("capture").assert().success();
    fs::write(source.join("global-v35"), b"day 101, all lost").unwrap();

    savekeeper(temp.path())
        .args(["restore", "latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
    assert_eq!(fs::read(source.join("global-v35")).unwrap(), b"day 101, all lost");

    savekeeper(temp.path())
        .args(["restore", "latest", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup restored to"));
    assert_eq!(fs::read(source.join("global-v35")).unwrap(), b"day 100");
}

#[test]
fn test_cli_restore_previous_missing() {
    let (temp, _source) = configured_home();
    savekeeper(temp.path()).arg("capture").assert().success();

    savekeeper(temp.path())
        .args(["restore", "latest", "--previous", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_cli_delete_day() {
    let (temp, _source) = configured_home();
    savekeeper(temp.path()).arg("capture").assert().success();

    savekeeper(temp.path())
        .args(["delete", "latest", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted backup folder"));

    savekeeper(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found."));
}

#[test]
fn test_cli_list_long_does_not_enable_debug_logging() {
    let (temp, _source) = configured_home();
    savekeeper(temp.path()).arg("capture").assert().success();
    let day = fs::read_dir(temp.path().join("backups"))
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    fs::write(day.join("junk"), b"not a backup").unwrap();

    savekeeper(temp.path())
        .args(["list", "-l"])
        .assert()
        .success()
        .stdout(predicate::str::contains("global-v35"))
        .stderr(predicate::str::contains("DEBUG").not());
}

#[test]
fn test_cli_delete_path_outside_archive_refused() {
    let (temp, _source) = configured_home();
    savekeeper(temp.path()).arg("capture").assert().success();

    let elsewhere = temp.path().join("elsewhere");
    fs::create_dir_all(&elsewhere).unwrap();
    let victim = elsewhere.join("1-notes-2024-01-01-00-00-00");
    fs::write(&victim, b"precious").unwrap();

    savekeeper(temp.path())
        .args(["delete", victim.to_str().unwrap(), "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    assert!(victim.exists());
    assert!(elsewhere.exists());

    savekeeper(temp.path())
        .args(["restore", victim.to_str().unwrap(), "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_cli_watch_with_duration() {
    let (temp, _source) = configured_home();
    savekeeper(temp.path())
        .args(["config", "set", "interval", "60"])
        .assert()
        .success();

    savekeeper(temp.path())
        .args(["watch", "--duration", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stopped after 1 pass(es)"));
}
