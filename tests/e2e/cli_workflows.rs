//! Drives the `memory-cli` binary itself, end to end, against a temp
//! `--base-path` — the operator surface over [`memory_core::Memory`].

use assert_cmd::Command;
use predicates::prelude::*;

fn cli(base_path: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("memory-cli").expect("memory-cli binary builds");
    cmd.arg("--base-path").arg(base_path);
    cmd
}

#[test]
fn remember_then_recall_round_trips_through_the_binary() {
    let tmp = tempfile::tempdir().unwrap();

    cli(tmp.path())
        .args(["remember", "s1", "the project uses axum", "--memory-type", "architectural-decision", "--confidence", "0.9"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());

    cli(tmp.path())
        .args(["recall", "s1", "--system-prompt", "you are a coding assistant"])
        .assert()
        .success()
        .stdout(predicate::str::contains("the project uses axum"));
}

#[test]
fn forget_hides_a_memory_from_stats() {
    let tmp = tempfile::tempdir().unwrap();

    let remember_output = cli(tmp.path())
        .args(["remember", "s1", "a temporary fact", "--confidence", "0.7"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let id = String::from_utf8(remember_output).unwrap().trim().to_string();

    cli(tmp.path())
        .args(["stats", "s1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("memories: 1"));

    cli(tmp.path()).args(["forget", "s1", &id]).assert().success();

    cli(tmp.path())
        .args(["stats", "s1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("memories: 0"));
}

#[test]
fn promote_reports_zero_promotions_with_nothing_pending() {
    let tmp = tempfile::tempdir().unwrap();

    cli(tmp.path())
        .args(["promote", "s1", "--trigger", "periodic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("promoted: 0, failed: 0"));
}

#[test]
fn recall_against_an_empty_session_prints_nothing() {
    let tmp = tempfile::tempdir().unwrap();

    cli(tmp.path())
        .args(["recall", "s1"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().trim());
}

#[test]
fn unknown_subcommand_fails_with_usage() {
    let tmp = tempfile::tempdir().unwrap();

    cli(tmp.path()).args(["not-a-command"]).assert().failure();
}
