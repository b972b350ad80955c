//! Configuration management
//!
//! The configuration is a TOML file with one table per concern. Every field
//! has a default so a partial (or missing) file is always valid. Derived
//! values such as the canvas height or the duration of one frame are plain
//! accessor methods computed from the stored fields.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::render::RendererKind;

/// Width in pixels of one terminal cell; also the divisor for the column count.
pub const CELL_WIDTH_PX: u32 = 10;

/// Upper bound for the typing speed and the cursor blink period.
const MAX_DELAY_MS: u64 = 60_000;

/// Errors while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub animation: AnimationConfig,
    pub dimensions: DimensionsConfig,
    pub theme: ThemeConfig,
    pub render: RenderConfig,
    pub commands: CommandsConfig,
}

/// Timing and decoration of the recorded animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Frames per second of the recording
    pub fps: u32,
    /// Number of terminal lines visible in each frame
    pub line_count: usize,
    /// Base typing delay in milliseconds; each character takes between 1x and 2x this
    pub typing_speed_ms: u64,
    /// Seed for the typing rhythm. 0 picks a fresh seed per run.
    pub seed: u64,
    /// Prefix every visible line with its line number
    pub line_numbers: bool,
    /// GIF quantization quality, 1 (best) to 30 (fastest)
    pub quality: u8,
    /// Number of loops. 0 repeats forever.
    pub repeat: u16,
    /// How long the last frame is held before the animation ends
    pub final_hold_ms: u64,
    pub cursor: CursorConfig,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            line_count: 20,
            typing_speed_ms: 50,
            seed: 0,
            line_numbers: false,
            quality: 10,
            repeat: 0,
            final_hold_ms: 2000,
            cursor: CursorConfig::default(),
        }
    }
}

/// Cursor glyph appended to the end of the buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Blink period in milliseconds. 0 disables blinking.
    pub blink_ms: u64,
    /// Glyph drawn at the cursor position. Empty disables the cursor.
    pub glyph: String,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            blink_ms: 500,
            glyph: "█".to_string(),
        }
    }
}

/// Canvas geometry in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionsConfig {
    pub width: u32,
    pub padding_x: u32,
    pub padding_y: u32,
    pub line_height: u32,
    pub font_size: f32,
}

impl Default for DimensionsConfig {
    fn default() -> Self {
        Self {
            width: 800,
            padding_x: 10,
            padding_y: 20,
            line_height: 20,
            font_size: 16.0,
        }
    }
}

/// Colors and font used by the bitmap and vector renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Background color as `#rrggbb`
    pub background: String,
    /// Text color as `#rrggbb`
    pub foreground: String,
    /// CSS font family for the SVG output
    pub font_family: String,
    /// Explicit font file for the GIF renderer; system monospace fonts are searched otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: "#1e1e2e".to_string(),
            foreground: "#cdd6f4".to_string(),
            font_family: "monospace".to_string(),
            font_path: None,
        }
    }
}

impl ThemeConfig {
    pub fn background_rgb(&self) -> Result<[u8; 3], ConfigError> {
        parse_hex_color("theme.background", &self.background)
    }

    pub fn foreground_rgb(&self) -> Result<[u8; 3], ConfigError> {
        parse_hex_color("theme.foreground", &self.foreground)
    }
}

/// Renderer selection and output metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Renderer used when the output extension is not recognized
    pub renderer: RendererKind,
    /// Title written into the recording metadata
    pub title: String,
    /// External program that rasterizes asciicast recordings (e.g. `agg`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast_rasterizer: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            renderer: RendererKind::Gif,
            title: "termreel".to_string(),
            cast_rasterizer: Some("agg".to_string()),
        }
    }
}

/// Behaviour of `enter` with a non-empty pending command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Run typed commands through the shell. When false, `enter` only
    /// breaks the line (dry run).
    pub execute: bool,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self { execute: true }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults when
    /// no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(write_err)
    }

    /// `<config dir>/termreel/config.toml`
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("termreel").join("config.toml"))
    }

    /// Reject values that would make the frame clock or the canvas meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animation.fps == 0 {
            return Err(invalid("animation.fps", "must be at least 1"));
        }
        if self.animation.fps > 1000 {
            return Err(invalid("animation.fps", "must be at most 1000"));
        }
        if self.animation.typing_speed_ms > MAX_DELAY_MS {
            return Err(invalid("animation.typing_speed_ms", "must be at most 60000"));
        }
        if self.animation.cursor.blink_ms > MAX_DELAY_MS {
            return Err(invalid("animation.cursor.blink_ms", "must be at most 60000"));
        }
        if self.animation.line_count == 0 {
            return Err(invalid("animation.line_count", "must be at least 1"));
        }
        if !(1..=30).contains(&self.animation.quality) {
            return Err(invalid("animation.quality", "must be between 1 and 30"));
        }
        if self.dimensions.line_height == 0 {
            return Err(invalid("dimensions.line_height", "must be at least 1"));
        }
        if self.dimensions.font_size <= 0.0 {
            return Err(invalid("dimensions.font_size", "must be positive"));
        }
        self.theme.background_rgb()?;
        self.theme.foreground_rgb()?;
        Ok(())
    }

    /// Duration of one frame in milliseconds.
    pub fn ms_per_frame(&self) -> f64 {
        1000.0 / f64::from(self.animation.fps.max(1))
    }

    /// Canvas height: vertical padding on both sides plus one line height per visible line.
    pub fn height_px(&self) -> u32 {
        let lines = u32::try_from(self.animation.line_count).unwrap_or(u32::MAX);
        self.dimensions
            .padding_y
            .saturating_mul(2)
            .saturating_add(lines.saturating_mul(self.dimensions.line_height))
    }

    /// Terminal columns that fit the canvas width.
    pub fn cols(&self) -> u32 {
        (self.dimensions.width / CELL_WIDTH_PX).max(1)
    }

    /// Cursor blink period expressed in frames (rounded). `None` when blinking is disabled.
    pub fn blink_frames(&self) -> Option<u64> {
        let blink_ms = self.animation.cursor.blink_ms;
        if blink_ms == 0 {
            return None;
        }
        let fps = u64::from(self.animation.fps.max(1));
        Some(blink_ms.saturating_mul(fps).saturating_add(500) / 1000)
    }
}

fn invalid(field: &'static str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.to_string(),
    }
}

/// Parse `#rrggbb` (or `rrggbb`) into RGB bytes.
pub fn parse_hex_color(field: &'static str, value: &str) -> Result<[u8; 3], ConfigError> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid(field, &format!("'{}' is not a #rrggbb color", value)));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| invalid(field, &format!("'{}' is not a #rrggbb color", value)))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}
