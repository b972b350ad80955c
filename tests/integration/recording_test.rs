//! End-to-end tests for the Recorder

use serde_json::json;
use tempfile::TempDir;
use termreel::asciicast::AsciicastFile;
use termreel::preview::NullPreview;
use termreel::session::LINE_NUMBER_WIDTH;
use termreel::{Recorder, RunStatus};

use crate::helpers::{interpret, steps, test_config};

#[test]
fn copy_clear_paste_reproduces_the_span() {
    let config = test_config();
    let session = interpret(
        &config,
        &steps(json!([
            {"action": "type", "payload": "alpha beta"},
            {"action": "enter"},
            {"action": "type", "payload": "gamma delta"},
            {"action": "copy", "payload": {"startLine": 1, "startPos": 6, "endLine": 2, "endPos": 5}},
            {"action": "clear"},
            {"action": "paste"}
        ])),
    );
    assert_eq!(session.clipboard(), "beta\ngamma");
    assert_eq!(session.buffer(), "beta\ngamma");
}

#[test]
fn same_seed_same_frames() {
    let config = test_config();
    let script = steps(json!([
        {"action": "type", "payload": "git status"},
        {"action": "delete", "payload": 6},
        {"action": "type", "payload": "log"},
        {"action": "enter"}
    ]));
    let a = interpret(&config, &script);
    let b = interpret(&config, &script);
    assert_eq!(a.frames(), b.frames());
    assert_eq!(a.buffer(), "git log\n");
}

#[test]
fn line_numbers_decorate_visible_lines() {
    let mut config = test_config();
    config.animation.line_numbers = true;
    config.animation.cursor.glyph = String::new();
    config.animation.line_count = 2;
    let session = interpret(
        &config,
        &steps(json!([
            {"action": "type", "payload": "one"},
            {"action": "enter"},
            {"action": "type", "payload": "two"},
            {"action": "enter"},
            {"action": "type", "payload": "abc"},
            {"action": "enter"}
        ])),
    );
    let last = session.frames().last().unwrap();
    assert_eq!(last.lines, vec!["003 abc", "004 "]);
    let last_text = last
        .lines
        .iter()
        .map(|l| &l[LINE_NUMBER_WIDTH + 1..])
        .filter(|l| !l.is_empty())
        .last()
        .unwrap();
    assert_eq!(last_text, "abc");
}

#[test]
fn interrupted_run_keeps_partial_recording() {
    let dir = TempDir::new().unwrap();
    let cancel = termreel::CancelFlag::new();
    cancel.cancel();
    let recorder = Recorder::new(test_config()).with_cancel_flag(cancel);
    let recording = recorder
        .record(
            &steps(json!([{"action": "type", "payload": "never typed"}])),
            &dir.path().join("cut.cast"),
            &mut NullPreview::new(),
        )
        .unwrap();

    assert_eq!(recording.status, RunStatus::Interrupted);
    assert_eq!(recording.status.exit_code(), 0);
    assert_eq!(recording.transcript, "");
    assert!(recording.path.exists());
}

#[test]
fn cast_recording_snapshot() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config();
    config.animation.line_count = 2;
    config.animation.final_hold_ms = 500;
    config.animation.cursor.glyph = String::new();
    config.render.title = "snap".to_string();

    let recording = Recorder::new(config)
        .record(
            &steps(json!([{"action": "enter"}])),
            &dir.path().join("snap.cast"),
            &mut NullPreview::new(),
        )
        .unwrap();

    assert_eq!(recording.frame_count, 15);
    let text = std::fs::read_to_string(&recording.path).unwrap();
    insta::assert_snapshot!(text, @r###"
    {"version":3,"term":{"cols":20,"rows":2},"title":"snap"}
    [0.0,"o","\u001b[H\u001b[2J\r\n"]
    [1.5,"o",""]
    "###);

    let cast = AsciicastFile::parse_str(&text).unwrap();
    assert!((cast.duration() - 1.5).abs() < 1e-9);
}
