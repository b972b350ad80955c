//! Command-line interface definition.
//!
//! Lives in the library so the `xtask` man page generator can reuse it.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::render::{path::set_extension, RendererKind};

/// Environment variable consulted when no output path is given.
pub const OUTPUT_ENV: &str = "TERMREEL_OUTPUT";

#[cfg(not(feature = "release"))]
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ", built ",
    env!("TERMREEL_BUILD_DATE"),
    ")"
);

#[cfg(feature = "release")]
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("TERMREEL_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "termreel")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Record scripted terminal demos as GIF, SVG or asciicast")]
#[command(long_about = "termreel replays a JSON script of terminal actions \
(type, delete, enter, copy, paste, clear, waitForOutput) against a simulated \
terminal, runs the typed commands for real, and renders the session as an \
animation.

Example script:
  [
    {\"action\": \"type\", \"payload\": \"echo hello\"},
    {\"action\": \"enter\"},
    {\"action\": \"waitForOutput\", \"payload\": \"hello\", \"timeoutMs\": 3000}
  ]")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a script and record it
    #[command(long_about = "Run a script and record it.

The output extension picks the renderer (.gif, .svg or .cast); any other
extension falls back to the configured renderer. Without an OUTPUT argument
the path comes from $TERMREEL_OUTPUT, then from the script name.

EXAMPLES:
    termreel run demo.json                 Record demo.gif
    termreel run demo.json out/demo.svg    Record an SVG
    termreel run demo.json --headless      No live preview
    termreel run demo.json --seed 42       Reproducible typing rhythm")]
    Run(RunArgs),

    /// Show or initialize the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Print shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show {
        /// Read this file instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write the default configuration to the config path
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Script file (JSON array of steps)
    pub script: PathBuf,

    /// Artifact path
    pub output: Option<PathBuf>,

    /// Configuration file (defaults to the user config)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Force a renderer; the output extension is rewritten to match
    #[arg(long, short = 'r', value_enum)]
    pub renderer: Option<RendererKind>,

    /// Frames per second
    #[arg(long)]
    pub fps: Option<u32>,

    /// Visible terminal lines
    #[arg(long)]
    pub lines: Option<usize>,

    /// Typing rhythm seed (0 picks a fresh one)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip the live preview
    #[arg(long)]
    pub headless: bool,

    /// Record as fast as possible instead of in real time
    #[arg(long)]
    pub no_pace: bool,

    /// Do not execute typed commands; `enter` only breaks the line
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(renderer) = self.renderer {
            config.render.renderer = renderer;
        }
        if let Some(fps) = self.fps {
            config.animation.fps = fps;
        }
        if let Some(lines) = self.lines {
            config.animation.line_count = lines;
        }
        if let Some(seed) = self.seed {
            config.animation.seed = seed;
        }
        if self.dry_run {
            config.commands.execute = false;
        }
    }

    /// Resolve the artifact path: argument, then `$TERMREEL_OUTPUT`, then
    /// the script's stem with the configured renderer's extension.
    pub fn output_path(&self, config: &Config, env_output: Option<String>) -> PathBuf {
        let output = self
            .output
            .clone()
            .or_else(|| env_output.filter(|v| !v.trim().is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| default_output(&self.script, config.render.renderer));

        match self.renderer {
            Some(kind) => set_extension(&output, kind.extension()),
            None => output,
        }
    }
}

fn default_output(script: &Path, kind: RendererKind) -> PathBuf {
    let stem = script
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "recording".into());
    set_extension(Path::new(&stem), kind.extension())
}
