use assert_cmd::Command;
use predicates::prelude::*;

fn penny() -> Command {
    Command::cargo_bin("penny").unwrap()
}

#[test]
fn no_args_prints_usage() {
    penny()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_subcommands() {
    penny()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dashboard"))
        .stdout(predicate::str::contains("tx"))
        .stdout(predicate::str::contains("budget"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn help_lists_password_recovery_commands() {
    penny()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("forgot-password"))
        .stdout(predicate::str::contains("reset-password"))
        .stdout(predicate::str::contains("verify-email"));
}

#[test]
fn reset_password_requires_token() {
    penny()
        .args(["reset-password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--token"));
}

#[test]
fn tx_add_requires_category() {
    penny()
        .args(["tx", "add", "12.50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--category"));
}

#[test]
fn tx_add_rejects_non_numeric_amount() {
    penny()
        .args(["tx", "add", "lots", "--category", "food"])
        .assert()
        .failure();
}

#[test]
fn budget_set_requires_both_limits() {
    penny()
        .args(["budget", "set", "--daily", "50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--monthly"));
}
