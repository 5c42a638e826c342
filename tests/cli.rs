//! Exit-code and output contract of the `driftcheck` binary.

#![cfg(unix)]

use std::process::{Command, Output};

use serde_json::Value;

fn run_check(args: &[&str], script: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_driftcheck"))
        .arg("check")
        .args(args)
        .args(["--", "sh", "-c", script])
        .output()
        .expect("run driftcheck check")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_clean_plan_exits_zero() {
    let output = run_check(&[], "echo 'No changes. Infrastructure is up-to-date.'");
    assert_eq!(output.status.code(), Some(0), "stderr={}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("up to date"));
}

#[test]
fn test_pending_changes_exit_one() {
    let output = run_check(&[], "echo 'Plan: 3 to add, 0 to change, 0 to destroy.'");
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("drift detected"));
    assert!(out.contains("Plan: 3 to add"));
}

#[test]
fn test_failing_tool_exits_two() {
    let output = run_check(&[], "echo 'Error: invalid credentials' >&2; exit 1");
    assert_eq!(output.status.code(), Some(2));
    let out = stdout(&output);
    assert!(out.contains("exited with code 1"));
    assert!(out.contains("invalid credentials"));
}

#[test]
fn test_custom_marker_flag() {
    let output = run_check(&["--marker", "all clear"], "echo 'all clear'");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_timeout_flag_exits_two() {
    let output = run_check(&["--timeout-secs", "1"], "sleep 30");
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("exited with code 124"));
}

#[test]
fn test_json_output_is_stable() {
    let output = run_check(&["--json"], "echo 'No changes. Infrastructure is up-to-date.'");
    assert_eq!(output.status.code(), Some(0));

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid check json");
    assert_eq!(value["verdict"], "no_drift");
    assert_eq!(value["exit_code"], 0);
    assert_eq!(value["result"]["exit_code"], 0);
    assert!(value["result"]["duration_secs"].is_number());
    assert!(
        value["result"]["combined_output"]
            .as_str()
            .expect("combined output is a string")
            .contains("No changes.")
    );
}

#[test]
fn test_json_output_on_drift() {
    let output = run_check(&["--json"], "echo 'Plan: 1 to add, 0 to change, 0 to destroy.'");
    assert_eq!(output.status.code(), Some(1));

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid check json");
    assert_eq!(value["verdict"], "drift_detected");
    assert_eq!(value["exit_code"], 1);
}

#[test]
fn test_drift_exit_code_flag_downgrades_failure() {
    // terraform's -detailed-exitcode reports 2 for a non-empty plan; with
    // the flag that is drift, not an execution error.
    let output = run_check(&["--drift-exit-code", "2"], "echo 'Plan: 1 to add'; exit 2");
    assert_eq!(output.status.code(), Some(1));

    let without_flag = run_check(&[], "echo 'Plan: 1 to add'; exit 2");
    assert_eq!(without_flag.status.code(), Some(2));
}
