//! Simulated terminal session.
//!
//! [`Session`] owns everything one run mutates: the text buffer, the pending
//! command, the internal clipboard and the recorded frames. Frames are only
//! ever appended through [`Session::advance`] and [`Session::record_frame`].

mod clock;
mod screen;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::script::CopySpan;

pub use clock::FrameClock;
pub use screen::{project, Frame, ScreenSettings, LINE_NUMBER_WIDTH};

/// Mutable state of a single recording run.
#[derive(Debug, Clone)]
pub struct Session {
    buffer: String,
    pending_command: String,
    clipboard: String,
    frames: Vec<Frame>,
    output_path: PathBuf,
    environment: Vec<(OsString, OsString)>,
    clock: FrameClock,
    screen: ScreenSettings,
}

impl Session {
    /// Create a session, capturing the current process environment.
    pub fn new(config: &Config, output_path: &Path) -> Self {
        Self::with_environment(config, output_path, std::env::vars_os().collect())
    }

    pub fn with_environment(
        config: &Config,
        output_path: &Path,
        environment: Vec<(OsString, OsString)>,
    ) -> Self {
        Self {
            buffer: String::new(),
            pending_command: String::new(),
            clipboard: String::new(),
            frames: Vec::new(),
            output_path: output_path.to_path_buf(),
            environment,
            clock: FrameClock::new(config.animation.fps),
            screen: ScreenSettings::from_config(config),
        }
    }

    // === Buffer ===

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn pending_command(&self) -> &str {
        &self.pending_command
    }

    pub fn clipboard(&self) -> &str {
        &self.clipboard
    }

    /// Append typed text: goes to both the buffer and the pending command.
    pub fn type_str(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.pending_command.push_str(text);
    }

    /// Append text that was not typed (command output, line breaks, errors).
    pub fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Remove up to `count` trailing characters. The pending command shrinks
    /// by the same amount (as far as it reaches) so it stays a suffix of the
    /// buffer. Returns how many characters were removed.
    pub fn delete_trailing(&mut self, count: usize) -> usize {
        let mut removed = 0;
        while removed < count && self.buffer.pop().is_some() {
            self.pending_command.pop();
            removed += 1;
        }
        removed
    }

    /// Drain the pending command, returning it trimmed.
    pub fn take_pending(&mut self) -> String {
        let command = self.pending_command.trim().to_string();
        self.pending_command.clear();
        command
    }

    /// Reset buffer and pending command. The clipboard survives.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pending_command.clear();
    }

    pub fn set_clipboard(&mut self, text: String) {
        self.clipboard = text;
    }

    /// Extract `span` from the current buffer.
    pub fn copy_span(&self, span: &CopySpan) -> String {
        copy_span(&self.buffer, span)
    }

    // === Frames ===

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// What the screen shows right now.
    pub fn snapshot(&self) -> Frame {
        project(&self.buffer, self.frames.len(), &self.screen)
    }

    /// Advance the frame clock by `ms`, recording one frame per elapsed tick.
    /// Returns the number of frames appended.
    pub fn advance(&mut self, ms: u64) -> usize {
        let ticks = self.clock.tick(ms);
        for _ in 0..ticks {
            self.record_frame();
        }
        ticks
    }

    /// Record exactly one frame regardless of the clock.
    pub fn record_frame(&mut self) {
        let frame = self.snapshot();
        self.frames.push(frame);
    }

    pub fn frame_ms(&self) -> u64 {
        self.clock.frame_ms()
    }

    // === Run context ===

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn environment(&self) -> &[(OsString, OsString)] {
        &self.environment
    }
}

/// Extract an inclusive span: the first line from `start_pos`, the last line
/// up to `end_pos`, whole lines in between.
pub fn copy_span(buffer: &str, span: &CopySpan) -> String {
    let lines: Vec<&str> = buffer.split('\n').collect();
    let start = span.start_line.saturating_sub(1);
    let end = span.end_line.min(lines.len());
    if start >= end {
        return String::new();
    }

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            let from = if offset == 0 { span.start_pos } else { 0 };
            let to = (span.start_line + offset == span.end_line).then_some(span.end_pos);
            slice_chars(line, from, to)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn slice_chars(line: &str, from: usize, to: Option<usize>) -> String {
    let chars = line.chars().skip(from);
    match to {
        Some(to) => chars.take(to.saturating_sub(from)).collect(),
        None => chars.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let mut config = Config::default();
        config.animation.cursor.glyph = String::new();
        Session::with_environment(&config, Path::new("out.gif"), Vec::new())
    }

    fn span(start_line: usize, start_pos: usize, end_line: usize, end_pos: usize) -> CopySpan {
        CopySpan {
            start_line,
            start_pos,
            end_line,
            end_pos,
        }
    }

    #[test]
    fn typed_text_tracks_pending_command() {
        let mut s = session();
        s.emit("$ ");
        s.type_str("ls");
        assert_eq!(s.buffer(), "$ ls");
        assert_eq!(s.pending_command(), "ls");
    }

    #[test]
    fn take_pending_trims_and_drains() {
        let mut s = session();
        s.type_str("  echo hi  ");
        assert_eq!(s.take_pending(), "echo hi");
        assert_eq!(s.pending_command(), "");
        assert_eq!(s.buffer(), "  echo hi  ");
    }

    #[test]
    fn delete_keeps_pending_a_suffix() {
        let mut s = session();
        s.emit("out\n");
        s.type_str("lsx");
        assert_eq!(s.delete_trailing(1), 1);
        assert_eq!(s.pending_command(), "ls");
        assert!(s.buffer().ends_with(s.pending_command()));

        // deleting past the pending command eats into emitted text
        assert_eq!(s.delete_trailing(3), 3);
        assert_eq!(s.buffer(), "ou");
        assert_eq!(s.pending_command(), "");
    }

    #[test]
    fn delete_more_than_buffer_removes_everything() {
        let mut s = session();
        s.type_str("ab");
        assert_eq!(s.delete_trailing(10), 2);
        assert_eq!(s.buffer(), "");
    }

    #[test]
    fn delete_handles_multibyte_chars() {
        let mut s = session();
        s.type_str("héllo→");
        s.delete_trailing(2);
        assert_eq!(s.buffer(), "héll");
    }

    #[test]
    fn clear_keeps_clipboard() {
        let mut s = session();
        s.type_str("abc");
        s.set_clipboard("abc".to_string());
        s.clear();
        assert_eq!(s.buffer(), "");
        assert_eq!(s.pending_command(), "");
        assert_eq!(s.clipboard(), "abc");
    }

    #[test]
    fn advance_records_one_frame_per_tick() {
        let mut s = session();
        s.type_str("x");
        assert_eq!(s.advance(1000), 10);
        assert_eq!(s.frame_count(), 10);
        assert!(s.frames().iter().all(|f| f.lines == vec!["x"]));
    }

    #[test]
    fn sub_frame_advance_records_nothing_yet() {
        let mut s = session();
        assert_eq!(s.advance(50), 0);
        assert_eq!(s.frame_count(), 0);
        assert_eq!(s.advance(50), 1);
    }

    #[test]
    fn copy_span_multi_line() {
        let buffer = "first line\nsecond line\nthird line";
        assert_eq!(copy_span(buffer, &span(1, 6, 3, 5)), "line\nsecond line\nthird");
    }

    #[test]
    fn copy_span_single_line_applies_both_bounds() {
        assert_eq!(copy_span("hello world", &span(1, 6, 1, 9)), "wor");
    }

    #[test]
    fn copy_span_clamps_past_the_end() {
        let buffer = "a\nbc";
        assert_eq!(copy_span(buffer, &span(2, 0, 9, 9)), "bc");
        assert_eq!(copy_span(buffer, &span(5, 0, 9, 9)), "");
    }

    #[test]
    fn copy_span_reversed_range_is_empty() {
        assert_eq!(copy_span("a\nb\nc", &span(3, 0, 1, 1)), "");
    }
}
