//! Cross-renderer tests: every renderer sees the same frames

use std::fs;
use std::io::Cursor;

use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use serde_json::json;
use tempfile::TempDir;
use termreel::preview::NullPreview;
use termreel::{Recorder, RunStatus};

use crate::helpers::{interpret, steps, test_config};

fn demo_steps() -> Vec<termreel::RawStep> {
    steps(json!([
        {"action": "type", "payload": "ls -la"},
        {"action": "enter"},
        {"action": "type", "payload": "cat notes.txt"},
        {"action": "delete", "payload": 9},
        {"action": "type", "payload": "todo"}
    ]))
}

/// Text lines of every `<text>` block in an SVG document.
fn svg_frames(svg: &str) -> Vec<Vec<String>> {
    svg.split(r#"<text class="frame" opacity="0">"#)
        .skip(1)
        .map(|block| {
            let block = block.split("</text>").next().unwrap();
            block
                .split(r#"xml:space="preserve">"#)
                .skip(1)
                .map(|rest| rest.split("</tspan>").next().unwrap().to_string())
                .collect()
        })
        .collect()
}

#[test]
fn gif_and_svg_have_the_same_frames() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let script = demo_steps();
    let expected = interpret(&config, &script);

    let recorder = Recorder::new(config);
    let gif = recorder
        .record(&script, &dir.path().join("demo.gif"), &mut NullPreview::new())
        .unwrap();
    let svg = recorder
        .record(&script, &dir.path().join("demo.svg"), &mut NullPreview::new())
        .unwrap();

    assert_eq!(gif.status, RunStatus::Completed);
    assert_eq!(gif.frame_count, expected.frame_count());
    assert_eq!(svg.frame_count, expected.frame_count());

    // SVG: one block per frame, same lines
    let document = fs::read_to_string(&svg.path).unwrap();
    let blocks = svg_frames(&document);
    let expected_lines: Vec<Vec<String>> =
        expected.frames().iter().map(|f| f.lines.clone()).collect();
    assert_eq!(blocks, expected_lines);

    // GIF: one image per frame; equal text gives equal pixels
    let bytes = fs::read(&gif.path).unwrap();
    let images = GifDecoder::new(Cursor::new(bytes))
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap();
    assert_eq!(images.len(), expected.frame_count());
    for (i, pair) in expected.frames().windows(2).enumerate() {
        if pair[0] == pair[1] {
            assert_eq!(images[i].buffer(), images[i + 1].buffer(), "frame {}", i);
        }
    }
    assert_ne!(images.first().unwrap().buffer(), images.last().unwrap().buffer());
}

#[test]
fn cast_screens_follow_the_frames() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let script = demo_steps();
    let expected = interpret(&config, &script);

    let recording = Recorder::new(config)
        .record(&script, &dir.path().join("demo.cast"), &mut NullPreview::new())
        .unwrap();
    let text = fs::read_to_string(&recording.path).unwrap();
    let cast = termreel::asciicast::AsciicastFile::parse_str(&text).unwrap();

    let mut distinct = expected.frames().to_vec();
    distinct.dedup();
    let screens: Vec<&str> = cast
        .events
        .iter()
        .map(|e| e.data.as_str())
        .filter(|d| !d.is_empty())
        .collect();
    assert_eq!(screens.len(), distinct.len());
    let last = screens.last().unwrap();
    assert!(last.contains("ls -la\r\ncat todo"));

    let frame_secs = recording.frame_count as f64 / 10.0;
    assert!((cast.duration() - frame_secs).abs() < 0.001);
}
