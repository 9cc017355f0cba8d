//! Smoke tests -- verify the binary runs and the CLI surface is intact.

use assert_cmd::Command;

#[test]
fn test_cli_help() {
    Command::cargo_bin("bandmeter")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "Self-hosted bandwidth test server",
        ));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("bandmeter")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("bandmeter"));
}

#[test]
fn test_serve_subcommand_exists() {
    Command::cargo_bin("bandmeter")
        .unwrap()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicates::str::contains("--bind"));
}

#[test]
fn test_show_config_prints_defaults() {
    Command::cargo_bin("bandmeter")
        .unwrap()
        .arg("show-config")
        .assert()
        .success()
        .stdout(predicates::str::contains("max_download_mb = 50"));
}

#[test]
fn test_show_config_with_missing_file_fails() {
    Command::cargo_bin("bandmeter")
        .unwrap()
        .args(["show-config", "--config", "/nonexistent/bandmeter.toml"])
        .assert()
        .failure();
}
