//! Integration tests for the termreel binary

use std::fs;

use serde_json::json;
use tempfile::TempDir;
use termreel::asciicast::AsciicastFile;

use crate::helpers::{run_termreel, write_config, write_script};

fn path_str(path: &std::path::Path) -> &str {
    path.to_str().unwrap()
}

// ============================================================================
// Help Output Tests
// ============================================================================

#[test]
fn run_help_exits_0_and_shows_usage() {
    let (stdout, _stderr, exit_code) = run_termreel(&["run", "--help"], &[]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("<SCRIPT>"));
    assert!(stdout.contains("--dry-run"));
    assert!(stdout.contains("TERMREEL_OUTPUT"));
}

#[test]
fn version_includes_build_info() {
    let (stdout, _stderr, exit_code) = run_termreel(&["--version"], &[]);
    assert_eq!(exit_code, 0);
    assert!(stdout.starts_with("termreel "));
}

#[test]
fn run_without_script_is_a_usage_error() {
    let (_stdout, stderr, exit_code) = run_termreel(&["run"], &[]);

    assert_eq!(exit_code, 2);
    assert!(stderr.contains("<SCRIPT>"));
}

#[test]
fn completions_are_generated() {
    let (stdout, _stderr, exit_code) = run_termreel(&["completions", "bash"], &[]);
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("termreel"));
}

#[test]
fn config_show_prints_effective_toml() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let (stdout, _stderr, exit_code) =
        run_termreel(&["config", "show", "--config", path_str(&config)], &[]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("[animation]"));
    assert!(stdout.contains("seed = 4242"));
    assert!(stdout.contains("[commands]"));
}

// ============================================================================
// Recording Tests
// ============================================================================

#[test]
fn unknown_action_exits_1_and_still_writes_artifact() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let script = write_script(
        dir.path(),
        "bad.json",
        json!([
            {"action": "type", "payload": "hello"},
            {"action": "teleport"}
        ]),
    );
    let output = dir.path().join("bad.svg");

    let (stdout, stderr, exit_code) = run_termreel(
        &[
            "run",
            path_str(&script),
            path_str(&output),
            "--config",
            path_str(&config),
            "--headless",
            "--dry-run",
        ],
        &[],
    );

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("Unknown action: teleport"));
    assert!(stdout.contains("Recording saved as"));
    let svg = fs::read_to_string(&output).unwrap();
    assert!(svg.contains("ERROR: Unknown action: teleport"));
}

#[test]
fn wait_for_output_timeout_exits_1() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let script = write_script(
        dir.path(),
        "wait.json",
        json!([{"action": "waitForOutput", "payload": "READY", "timeoutMs": 200}]),
    );
    let output = dir.path().join("wait.cast");

    let (_stdout, stderr, exit_code) = run_termreel(
        &[
            "run",
            path_str(&script),
            path_str(&output),
            "--config",
            path_str(&config),
            "--headless",
        ],
        &[],
    );

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("Timeout waiting for output"));
}

#[test]
fn missing_script_is_reported() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");
    let (_stdout, stderr, exit_code) =
        run_termreel(&["run", path_str(&missing), "--headless"], &[]);

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("Failed to load script"));
}

#[test]
fn output_falls_back_to_environment() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let script = write_script(dir.path(), "env.json", json!([{"action": "type", "payload": "x"}]));
    let target = dir.path().join("from-env.svg");

    let (stdout, _stderr, exit_code) = run_termreel(
        &["run", path_str(&script), "--config", path_str(&config), "--headless"],
        &[("TERMREEL_OUTPUT", path_str(&target))],
    );

    assert_eq!(exit_code, 0);
    assert!(target.exists());
    assert!(stdout.contains("from-env.svg"));
}

#[test]
fn typed_line_is_last_visible_line_in_cast() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let script = write_script(
        dir.path(),
        "abc.json",
        json!([
            {"action": "type", "payload": "abc"},
            {"action": "enter"}
        ]),
    );
    let output = dir.path().join("abc.gif");

    let (stdout, _stderr, exit_code) = run_termreel(
        &[
            "run",
            path_str(&script),
            path_str(&output),
            "--config",
            path_str(&config),
            "--renderer",
            "cast",
            "--headless",
            "--dry-run",
        ],
        &[],
    );

    assert_eq!(exit_code, 0);
    let cast_path = dir.path().join("abc.cast");
    assert!(stdout.contains("abc.cast"));
    let cast = AsciicastFile::parse_str(&fs::read_to_string(cast_path).unwrap()).unwrap();
    let last_screen = cast
        .events
        .iter()
        .rev()
        .find(|e| !e.data.is_empty())
        .unwrap();
    let last_line = last_screen
        .data
        .trim_start_matches("\u{1b}[H\u{1b}[2J")
        .split("\r\n")
        .map(|line| line.trim_end_matches('█'))
        .filter(|line| !line.is_empty())
        .last()
        .unwrap();
    assert_eq!(last_line, "abc");
}

#[cfg(unix)]
#[test]
fn executed_command_output_is_recorded() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let script = write_script(
        dir.path(),
        "echo.json",
        json!([
            {"action": "type", "payload": "echo termreel-$((40 + 2))"},
            {"action": "enter"},
            {"action": "waitForOutput", "payload": "termreel-42", "timeoutMs": 2000}
        ]),
    );
    let output = dir.path().join("echo.cast");

    let (_stdout, stderr, exit_code) = run_termreel(
        &[
            "run",
            path_str(&script),
            path_str(&output),
            "--config",
            path_str(&config),
            "--headless",
        ],
        &[],
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    let cast = fs::read_to_string(&output).unwrap();
    assert!(cast.contains("termreel-42"));
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    assert_cmd::Command::cargo_bin("termreel")
        .unwrap()
        .arg("frobnicate")
        .assert()
        .code(2)
        .stderr(predicates::str::contains("frobnicate"));
}

#[test]
fn invalid_config_value_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[animation]\nfps = 0\n").unwrap();
    let script = write_script(dir.path(), "s.json", json!([]));

    assert_cmd::Command::cargo_bin("termreel")
        .unwrap()
        .args(["run", path_str(&script), "--config", path_str(&config), "--headless"])
        .assert()
        .code(1)
        .stderr(predicates::str::contains("animation.fps"));
}
