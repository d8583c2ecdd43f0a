//! Smoke tests for the `sertest` binary's command-line surface.
//!
//! Each run points `SERTEST_CONFIG` at an empty file in a scratch directory so
//! a developer's own configuration cannot leak in.

use std::process::{Command, Output};
use tempfile::TempDir;

fn sertest(args: &[&str]) -> Output {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("sertest.toml");
    std::fs::write(&config, "").unwrap();

    Command::new(env!("CARGO_BIN_EXE_sertest"))
        .args(args)
        .current_dir(dir.path())
        .env("SERTEST_CONFIG", &config)
        .env_remove("RUST_LOG")
        .env_remove("SERTEST_SERIAL_DEVICE")
        .env_remove("SERTEST_SERIAL_BAUD")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_prints_usage_and_fails() {
    for flag in ["-h", "-?"] {
        let output = sertest(&[flag]);
        assert!(!output.status.success());
        let out = stdout(&output);
        assert!(out.starts_with("sertest version 1.0\n"), "{out}");
        assert!(out.contains("usage: ./sertest [-v] [-d device] [-b baud] -t|-r"));
        assert!(out.contains("-s turns on single character mode"));
    }
}

#[test]
fn test_unknown_flag_prints_usage() {
    let output = sertest(&["-x"]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("usage: ./sertest"));
    assert!(!stderr(&output).is_empty());
}

#[test]
fn test_missing_mode_is_an_error() {
    let output = sertest(&["-d", "/dev/nonexistent_port_12345"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("ERROR- you must select a mode with -r or -t"));
}

#[test]
fn test_verbose_echoes_arguments() {
    let output = sertest(&["-v", "-d", "/dev/nonexistent_port_12345", "-b", "115200", "-s", "-t"]);
    let out = stdout(&output);
    assert!(out.contains("Arguments:"), "{out}");
    assert!(out.contains("-d: /dev/nonexistent_port_12345"));
    assert!(out.contains("-b: 115200"));
    assert!(out.contains("-r/t: 2"));
    assert!(out.contains("-s: 1"));
}

#[test]
fn test_open_failure_exits_with_failure() {
    let output = sertest(&["-r", "-d", "/dev/nonexistent_port_12345"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unable to open device file /dev/nonexistent_port_12345"));
}

#[test]
fn test_configure_failure_exits_with_failure() {
    let output = sertest(&["-t", "-d", "/dev/null"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unable to set options on device /dev/null"));
}
