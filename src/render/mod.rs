//! Renderers
//!
//! A [`Renderer`] turns the recorded frame sequence into an artifact on
//! disk. Three interchangeable formats exist:
//!
//! - [`GifRenderer`]: rasterized animation
//! - [`SvgRenderer`]: a single self-animating SVG document
//! - [`CastRenderer`]: asciicast v3, optionally rasterized by an external program
//!
//! A renderer is built once per run with [`build`], before any step runs, so
//! a configuration problem (missing font file, bad color) fails early.

mod cast;
mod gif;
pub mod layout;
pub mod path;
mod svg;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::RunError;
use crate::session::Frame;

pub use cast::CastRenderer;
pub use gif::GifRenderer;
pub use svg::{escape_xml, SvgRenderer};

/// Artifact formats.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Gif,
    Svg,
    Cast,
}

impl RendererKind {
    /// File extension the renderer writes by default.
    pub fn extension(self) -> &'static str {
        match self {
            RendererKind::Gif => "gif",
            RendererKind::Svg => "svg",
            RendererKind::Cast => "cast",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "gif" => Some(RendererKind::Gif),
            "svg" => Some(RendererKind::Svg),
            "cast" => Some(RendererKind::Cast),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        self.extension()
    }
}

impl std::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Turns a frame sequence into a persisted artifact.
pub trait Renderer {
    fn kind(&self) -> RendererKind;

    /// Write the artifact for `frames` next to `output` and return the path
    /// actually written (the extension may differ from `output`'s).
    fn render(&self, frames: &[Frame], output: &Path) -> Result<PathBuf, RunError>;
}

/// Pick the renderer for `output`: a known extension wins, otherwise the
/// configured default.
pub fn select(output: &Path, config: &Config) -> RendererKind {
    path::get_extension(output)
        .and_then(|ext| RendererKind::from_extension(&ext))
        .unwrap_or(config.render.renderer)
}

/// Construct a renderer for one run.
pub fn build(kind: RendererKind, config: &Config) -> Result<Box<dyn Renderer>, RunError> {
    let renderer: Box<dyn Renderer> = match kind {
        RendererKind::Gif => Box::new(GifRenderer::new(config)?),
        RendererKind::Svg => Box::new(SvgRenderer::new(config)?),
        RendererKind::Cast => Box::new(CastRenderer::new(config)),
    };
    tracing::debug!(renderer = %kind, "renderer ready");
    Ok(renderer)
}

/// Write `bytes` to `path`, creating parent directories as needed.
pub(crate) fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), RunError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    Ok(())
}

fn ensure_frames(renderer: RendererKind, frames: &[Frame]) -> Result<(), RunError> {
    if frames.is_empty() {
        return Err(RunError::Render {
            renderer: renderer.name(),
            message: "no frames to render".to_string(),
        });
    }
    Ok(())
}

fn init_error(renderer: RendererKind, message: impl ToString) -> RunError {
    RunError::RendererInit {
        renderer: renderer.name(),
        message: message.to_string(),
    }
}

fn render_error(renderer: RendererKind, message: impl ToString) -> RunError {
    RunError::Render {
        renderer: renderer.name(),
        message: message.to_string(),
    }
}
