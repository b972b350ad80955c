//! Screen projection.
//!
//! Turns the raw buffer into what is visible at one frame: the tail window,
//! optional line numbers and the blinking cursor glyph. Every renderer and
//! the live preview consume this projection, never the raw buffer.

use crate::config::Config;

/// Minimum width of the zero-padded line number gutter.
pub const LINE_NUMBER_WIDTH: usize = 3;

/// One recorded animation frame: already windowed and decorated lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub lines: Vec<String>,
}

impl Frame {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// The subset of [`Config`] the projection depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenSettings {
    pub line_count: usize,
    pub line_numbers: bool,
    pub cursor_glyph: String,
    /// Blink period in frames, `None` when blinking is disabled
    pub blink_frames: Option<u64>,
}

impl ScreenSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            line_count: config.animation.line_count.max(1),
            line_numbers: config.animation.line_numbers,
            cursor_glyph: config.animation.cursor.glyph.clone(),
            blink_frames: config.blink_frames(),
        }
    }

    /// Whether the cursor glyph is drawn at the given frame index.
    pub fn cursor_visible(&self, frame_count: usize) -> bool {
        if self.cursor_glyph.is_empty() {
            return false;
        }
        match self.blink_frames {
            None => true,
            Some(blink) => {
                let period = blink.max(1);
                (frame_count as u64) % period <= blink / 2
            }
        }
    }
}

/// Project `buffer` as it appears at `frame_count`.
pub fn project(buffer: &str, frame_count: usize, settings: &ScreenSettings) -> Frame {
    let all: Vec<&str> = buffer.split('\n').collect();
    let skip = all.len().saturating_sub(settings.line_count);
    let cursor = settings.cursor_visible(frame_count);
    let last = all.len() - 1;

    let lines = all
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(idx, line)| {
            let mut rendered = if settings.line_numbers {
                format!("{:0width$} {}", idx + 1, line, width = LINE_NUMBER_WIDTH)
            } else {
                (*line).to_string()
            };
            if cursor && idx == last {
                rendered.push_str(&settings.cursor_glyph);
            }
            rendered
        })
        .collect();

    Frame { lines }
}
