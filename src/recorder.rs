//! One recording run from script to artifact.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::error::RunError;
use crate::interpreter::{CancelFlag, Interpreter, RunStatus};
use crate::pace::Pace;
use crate::preview::Preview;
use crate::render;
use crate::script::RawStep;
use crate::session::Session;

/// Outcome of [`Recorder::record`].
#[derive(Debug, Clone)]
pub struct Recording {
    /// Artifact actually written
    pub path: PathBuf,
    pub status: RunStatus,
    pub frame_count: usize,
    /// Final buffer contents, including any `ERROR:` line
    pub transcript: String,
}

/// Runs scripts and renders the result.
pub struct Recorder {
    config: Config,
    pace: Pace,
    cancel: CancelFlag,
}

impl Recorder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            pace: Pace::Instant,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_pace(mut self, pace: Pace) -> Self {
        self.pace = pace;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Execute `steps` and write the artifact for `output`.
    ///
    /// The renderer is built before the first step, so renderer setup errors
    /// surface without running anything. A run that aborts or is interrupted
    /// is still rendered; only rendering failures are returned as `Err`.
    pub fn record(
        &self,
        steps: &[RawStep],
        output: &Path,
        preview: &mut dyn Preview,
    ) -> Result<Recording, RunError> {
        let kind = render::select(output, &self.config);
        let renderer = render::build(kind, &self.config)?;
        info!(renderer = %kind, steps = steps.len(), output = %output.display(), "recording");

        let session = Session::new(&self.config, output);
        let mut interpreter = Interpreter::new(&self.config, session, preview)
            .with_pace(self.pace)
            .with_cancel_flag(self.cancel.clone());
        let status = interpreter.run(steps);
        let session = interpreter.finish();

        let transcript = session.buffer().to_string();
        let output = session.output_path().to_path_buf();
        let frames = session.into_frames();
        let path = renderer.render(&frames, &output)?;

        Ok(Recording {
            path,
            status,
            frame_count: frames.len(),
            transcript,
        })
    }
}
