// CLI Binary Tests
// Exercise the failure paths that need no network access.

use std::process::{Command, Stdio};

fn logpilot(home: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_logpilot"));
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("GEMINI_API_KEY")
        .env_remove("GOOGLE_API_KEY")
        .env_remove("LOGPILOT_MEMORY_PATH")
        .stdin(Stdio::null());
    cmd
}

#[test]
fn test_missing_api_key_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");
    std::fs::write(&log, "INFO start\nERROR connection failed\n").unwrap();

    let output = logpilot(dir.path())
        .args(["--file", log.to_str().unwrap(), "--provider", "gemini", "--no-memory"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GEMINI_API_KEY"), "stderr: {}", stderr);
}

#[test]
fn test_empty_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = logpilot(dir.path()).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No log data provided"), "stderr: {}", stderr);
}

#[test]
fn test_unknown_output_format_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = logpilot(dir.path()).args(["--output", "html"]).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown output format"), "stderr: {}", stderr);
}

#[test]
fn test_unknown_provider_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");
    std::fs::write(&log, "ERROR boom\n").unwrap();

    let output = logpilot(dir.path())
        .args(["-f", log.to_str().unwrap(), "-p", "mystery", "--api-key", "k"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Provider not supported: mystery"), "stderr: {}", stderr);
}

#[test]
fn test_search_mode_needs_no_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");
    std::fs::write(&log, "INFO boot\nWARN slow\nERROR Connection Timeout\nINFO retry\n").unwrap();

    let output = logpilot(dir.path())
        .args(["-f", log.to_str().unwrap(), "--search", "timeout", "-C", "1"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(">      3  ERROR Connection Timeout"), "stdout: {}", stdout);
    assert!(stdout.contains("2  WARN slow"));
    assert!(!stdout.contains("INFO boot"));
}
