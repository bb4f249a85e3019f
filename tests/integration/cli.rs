//! Command-line contract of the `yuzu-updater` binary.
//!
//! Only failure paths that stop before any network request are exercised
//! here; full runs are covered through the library in `workflow`.

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;
use yuzu_updater::config::FileConfig;
use yuzu_updater::constants::{CONFIG_PATH_ENV, MARKER_FILE, NO_PROGRESS_ENV};

fn updater() -> Command {
    let mut cmd = Command::cargo_bin("yuzu-updater").unwrap();
    cmd.env_remove("RUST_LOG").env(NO_PROGRESS_ENV, "1");
    cmd
}

/// Empty overrides file so the user's own configuration never leaks in.
fn empty_overrides(temp: &TempDir) -> std::path::PathBuf {
    let path = temp.path().join("overrides.toml");
    fs::write(&path, "").unwrap();
    path
}

#[test]
fn test_help_lists_flags() {
    updater()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dir"))
        .stdout(predicate::str::contains("--check"))
        .stdout(predicate::str::contains("--no-progress"));
}

#[test]
fn test_version_flag() {
    updater()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_zero_timeout_is_a_usage_error() {
    updater().args(["--timeout", "0"]).assert().code(2);
}

#[test]
fn test_missing_directory_fails() {
    let temp = TempDir::new().unwrap();
    let overrides = empty_overrides(&temp);

    updater()
        .arg("--dir")
        .arg(temp.path().join("not-here"))
        .arg("--config")
        .arg(&overrides)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_corrupt_marker_is_removed_and_reported() {
    let temp = TempDir::new().unwrap();
    let overrides = empty_overrides(&temp);
    let install = temp.path().join("yuzu");
    fs::create_dir_all(&install).unwrap();
    let marker = install.join(MARKER_FILE);
    fs::write(&marker, "not-a-build").unwrap();

    updater()
        .arg("--dir")
        .arg(&install)
        .arg("--config")
        .arg(&overrides)
        .arg("--quiet")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("corrupt"));

    assert!(!marker.exists());
}

#[test]
fn test_invalid_overrides_file_fails() {
    let temp = TempDir::new().unwrap();
    let overrides = temp.path().join("overrides.toml");
    fs::write(&overrides, "timeout_secs = \"soon\"\n").unwrap();

    updater()
        .arg("--dir")
        .arg(temp.path())
        .arg("--config")
        .arg(&overrides)
        .assert()
        .code(1);
}

#[test]
fn test_overrides_path_from_environment_is_used_by_binary() {
    let temp = TempDir::new().unwrap();

    updater()
        .arg("--dir")
        .arg(temp.path())
        .env(CONFIG_PATH_ENV, temp.path().join("missing.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.toml"));
}

#[tokio::test]
#[serial]
async fn test_overrides_loaded_from_environment() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "releases_url = \"https://mirror.example/yuzu\"\n").unwrap();

    // SAFETY: serialized with every other test touching the environment.
    unsafe { std::env::set_var(CONFIG_PATH_ENV, &path) };
    let loaded = FileConfig::load(None).await;
    unsafe { std::env::remove_var(CONFIG_PATH_ENV) };

    assert_eq!(loaded.unwrap().releases_url.as_deref(), Some("https://mirror.example/yuzu"));
}

#[tokio::test]
#[serial]
async fn test_explicit_path_beats_environment() {
    let temp = TempDir::new().unwrap();
    let explicit = temp.path().join("explicit.toml");
    fs::write(&explicit, "product_name = \"yuzu\"\n").unwrap();

    unsafe { std::env::set_var(CONFIG_PATH_ENV, temp.path().join("missing.toml")) };
    let loaded = FileConfig::load(Some(&explicit)).await;
    unsafe { std::env::remove_var(CONFIG_PATH_ENV) };

    assert_eq!(loaded.unwrap().product_name.as_deref(), Some("yuzu"));
}
