//! asciicast v3 renderer.
//!
//! Each distinct frame becomes one output event that homes the cursor,
//! clears the screen and writes the frame's lines; runs of identical frames
//! collapse into the interval before the next event. The `.cast` file can
//! then be handed to an external rasterizer (`agg` by default) to produce a
//! GIF. A missing rasterizer is not an error: the cast is the artifact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, warn};

use super::path::set_extension;
use super::{ensure_frames, render_error, write_artifact, Renderer, RendererKind};
use crate::asciicast::{AsciicastFile, Event, Header, Quantizer};
use crate::config::Config;
use crate::error::RunError;
use crate::session::Frame;

/// Home cursor, clear screen.
const CLEAR_SCREEN: &str = "\u{1b}[H\u{1b}[2J";

pub struct CastRenderer {
    cols: u32,
    rows: usize,
    title: String,
    frame_us: u128,
    rasterizer: Option<String>,
    font_size: f32,
}

impl CastRenderer {
    pub fn new(config: &Config) -> Self {
        Self {
            cols: config.cols(),
            rows: config.animation.line_count.max(1),
            title: config.render.title.clone(),
            frame_us: 1_000_000 / u128::from(config.animation.fps.max(1)),
            rasterizer: config
                .render
                .cast_rasterizer
                .clone()
                .filter(|program| !program.trim().is_empty()),
            font_size: config.dimensions.font_size,
        }
    }

    /// Build the recording for `frames`.
    pub fn recording(&self, frames: &[Frame]) -> AsciicastFile {
        let rows = u32::try_from(self.rows).unwrap_or(u32::MAX);
        let mut cast = AsciicastFile::new(Header::new(self.cols, rows).with_title(&self.title));
        let mut quantizer = Quantizer::new(1_000);
        let mut pending_us: u128 = 0;
        let mut previous: Option<&Frame> = None;

        for frame in frames {
            if previous != Some(frame) {
                let interval = quantizer.next(pending_us);
                cast.push(Event::output(seconds(interval), self.screen(frame)));
                pending_us = 0;
                previous = Some(frame);
            }
            pending_us += self.frame_us;
        }

        // Keeps the last frame on screen for its full duration
        if pending_us > 0 {
            cast.push(Event::output(seconds(quantizer.next(pending_us)), ""));
        }
        cast
    }

    /// The output written for one frame: padded to the visible line count.
    fn screen(&self, frame: &Frame) -> String {
        let mut lines: Vec<&str> = frame.lines.iter().map(String::as_str).collect();
        lines.resize(lines.len().max(self.rows), "");
        format!("{}{}", CLEAR_SCREEN, lines.join("\r\n"))
    }

    /// Run the rasterizer on `cast_path`. Returns the GIF path, or `None`
    /// when the program is not installed.
    fn rasterize(&self, program: &str, cast_path: &Path) -> Result<Option<PathBuf>, RunError> {
        let gif_path = set_extension(cast_path, RendererKind::Gif.extension());
        let status = Command::new(program)
            .arg("--font-size")
            .arg(self.font_size.round().to_string())
            .arg(cast_path)
            .arg(&gif_path)
            .status();

        match status {
            Ok(status) if status.success() => Ok(Some(gif_path)),
            Ok(status) => Err(render_error(
                RendererKind::Cast,
                format!("{} exited with {}", program, status),
            )),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    rasterizer = program,
                    "rasterizer not installed, keeping the asciicast recording"
                );
                Ok(None)
            }
            Err(e) => Err(render_error(
                RendererKind::Cast,
                format!("failed to run {}: {}", program, e),
            )),
        }
    }
}

impl Renderer for CastRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Cast
    }

    fn render(&self, frames: &[Frame], output: &Path) -> Result<PathBuf, RunError> {
        ensure_frames(RendererKind::Cast, frames)?;
        let cast_path = set_extension(output, RendererKind::Cast.extension());
        let text = self
            .recording(frames)
            .to_string()
            .map_err(|e| render_error(RendererKind::Cast, e))?;
        write_artifact(&cast_path, text.as_bytes())?;
        info!(path = %cast_path.display(), frames = frames.len(), "asciicast written");

        let Some(program) = &self.rasterizer else {
            return Ok(cast_path);
        };
        match self.rasterize(program, &cast_path)? {
            Some(gif_path) => {
                info!(path = %gif_path.display(), rasterizer = %program, "cast rasterized");
                Ok(gif_path)
            }
            None => Ok(cast_path),
        }
    }
}

fn seconds(micros: u128) -> f64 {
    micros as f64 / 1_000_000.0
}
