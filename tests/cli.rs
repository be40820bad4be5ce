//! CLI-level integration tests driving the built binary end to end,
//! exercising only the paths that don't require a live browser or LLM.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn run_without_url_fails_with_a_clear_message() {
    let mut cmd = Command::cargo_bin("webqa-engine").unwrap();
    cmd.arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("target_url is required"));
}

#[test]
fn help_lists_run_and_serve_subcommands() {
    let mut cmd = Command::cargo_bin("webqa-engine").unwrap();
    let assert = cmd.arg("--help").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    assert!(stdout.contains("run"));
    assert!(stdout.contains("serve"));
}

#[test]
fn run_with_unreadable_config_file_fails() {
    let mut cmd = Command::cargo_bin("webqa-engine").unwrap();
    cmd.args(["run", "--config", "does/not/exist.toml", "--url", "https://example.test"])
        .assert()
        .failure();
}
