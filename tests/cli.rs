//! Argument validation for the `driver` binary, run as a black box.

use std::process::Command;

fn driver() -> Command {
    Command::new(env!("CARGO_BIN_EXE_driver"))
}

#[test]
fn too_few_arguments_exits_nonzero_with_usage() {
    let output = driver()
        .args(["tests/fixtures/sample.strace", "4096", "0.5"])
        .output()
        .expect("failed to run driver");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: driver"));
}

#[test]
fn help_flag_exits_successfully_with_usage() {
    let output = driver().arg("--help").output().expect("failed to run driver");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage: driver"));
}

#[test]
fn non_boolean_prefetch_token_is_rejected() {
    let output = driver()
        .args(["tests/fixtures/sample.strace", "4096", "0.5", "10000", "maybe"])
        .output()
        .expect("failed to run driver");

    assert!(!output.status.success());
}

#[test]
fn valid_invocation_without_training_trace_succeeds() {
    let output = driver()
        .args(["tests/fixtures/sample.strace", "4096", "0.5", "10000", "false"])
        .output()
        .expect("failed to run driver");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("calls=5"));
}

#[test]
fn valid_invocation_with_training_trace_succeeds() {
    let output = driver()
        .args([
            "tests/fixtures/sample.strace",
            "4096",
            "0.5",
            "10000",
            "tests/fixtures/sample.strace",
            "true",
        ])
        .output()
        .expect("failed to run driver");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("calls=5"));
}
