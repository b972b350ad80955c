//! Shared helpers for integration tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use termreel::preview::NullPreview;
use termreel::{Config, Interpreter, RawStep, Script, Session};

/// Small, deterministic configuration: fixed seed, no command execution,
/// no external rasterizer, tiny canvas.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.animation.seed = 4242;
    config.animation.line_count = 4;
    config.animation.final_hold_ms = 300;
    config.animation.quality = 30;
    config.dimensions.width = 200;
    config.commands.execute = false;
    config.render.cast_rasterizer = None;
    config
}

/// TOML equivalent of [`test_config`] for the binary.
pub const TEST_CONFIG_TOML: &str = r#"
[animation]
seed = 4242
line_count = 4
final_hold_ms = 300
quality = 30

[dimensions]
width = 200

[render]
cast_rasterizer = ""
"#;

pub fn steps(json: Value) -> Vec<RawStep> {
    Script::from_json(&json.to_string()).unwrap().steps
}

/// Write `json` as a script file in `dir`.
pub fn write_script(dir: &Path, name: &str, json: Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();
    path
}

pub fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, TEST_CONFIG_TOML).unwrap();
    path
}

/// Run the interpreter alone and return the finished session.
pub fn interpret(config: &Config, steps: &[RawStep]) -> Session {
    let session = Session::with_environment(config, Path::new("out.gif"), Vec::new());
    let mut preview = NullPreview::new();
    let mut interpreter = Interpreter::new(config, session, &mut preview);
    interpreter.run(steps);
    interpreter.finish()
}

/// Run the termreel binary and capture output.
pub fn run_termreel(args: &[&str], envs: &[(&str, &str)]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_termreel"))
        .args(args)
        .env_remove("TERMREEL_OUTPUT")
        .envs(envs.iter().copied())
        .output()
        .expect("Failed to execute termreel");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}
