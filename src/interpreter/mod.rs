//! Step interpreter
//!
//! Executes a script one step at a time against a [`Session`]. Each step is
//! converted to a [`Step`] when it is reached and dispatched to its handler
//! (see `handlers`). Handlers mutate the session, mirror the projection into
//! the [`Preview`] and advance the frame clock.
//!
//! # Control flow
//!
//! - A step that fails (unknown action, bad payload, timeout, command
//!   failure) ends the run through the abort path: the error is written
//!   into the transcript, one final frame is recorded and the run reports
//!   [`RunStatus::Aborted`].
//! - An interrupt (preview key or Ctrl+C) ends the run at the next check
//!   with [`RunStatus::Interrupted`]; everything recorded so far is kept.
//!
//! Either way [`Interpreter::finish`] still hands back a session whose
//! frames can be rendered.

mod handlers;
mod rhythm;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::RunError;
use crate::pace::Pace;
use crate::preview::Preview;
use crate::script::{RawStep, Step};
use crate::session::Session;

pub use rhythm::{SplitMix64, TypingRhythm};

/// Shared interrupt flag, set from a signal handler or the preview.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every step ran
    Completed,
    /// The user stopped the run; the artifact is truncated
    Interrupted,
    /// A step failed; the message is also in the transcript
    Aborted(String),
}

impl RunStatus {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunStatus::Completed | RunStatus::Interrupted => 0,
            RunStatus::Aborted(_) => 1,
        }
    }
}

/// Why a handler stopped early.
#[derive(Debug)]
pub(crate) enum Halt {
    Interrupted,
    Failed(RunError),
}

impl From<RunError> for Halt {
    fn from(err: RunError) -> Self {
        Halt::Failed(err)
    }
}

type HandlerResult = Result<(), Halt>;

/// Drives a script against a session.
pub struct Interpreter<'p> {
    session: Session,
    rhythm: TypingRhythm,
    pace: Pace,
    preview: &'p mut dyn Preview,
    cancel: CancelFlag,
    execute_commands: bool,
    final_hold_ms: u64,
}

impl<'p> Interpreter<'p> {
    pub fn new(config: &Config, session: Session, preview: &'p mut dyn Preview) -> Self {
        let rhythm = TypingRhythm::new(config.animation.typing_speed_ms, config.animation.seed);
        info!(seed = rhythm.seed(), "typing rhythm seeded");

        Self {
            session,
            rhythm,
            pace: Pace::Instant,
            preview,
            cancel: CancelFlag::new(),
            execute_commands: config.commands.execute,
            final_hold_ms: config.animation.final_hold_ms,
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

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Execute `steps` in order until the end, the first failure or an interrupt.
    pub fn run(&mut self, steps: &[RawStep]) -> RunStatus {
        self.refresh();

        for (index, raw) in steps.iter().enumerate() {
            if self.interrupted() {
                return self.interrupt(index);
            }

            let result = Step::try_from(raw)
                .map_err(Halt::from)
                .and_then(|step| {
                    debug!(index, action = step.name(), "executing step");
                    self.execute(&step)
                });

            match result {
                Ok(()) => {}
                Err(Halt::Interrupted) => return self.interrupt(index),
                Err(Halt::Failed(err)) => return self.abort(index, err),
            }
        }

        debug!(frames = self.session.frame_count(), "script completed");
        RunStatus::Completed
    }

    /// Hold the last frame and hand back the session for rendering.
    pub fn finish(mut self) -> Session {
        self.session.advance(self.final_hold_ms);
        if self.session.frame_count() == 0 {
            self.session.record_frame();
        }
        self.session
    }

    fn execute(&mut self, step: &Step) -> HandlerResult {
        match step {
            Step::Type(text) => self.type_text(text),
            Step::Delete(count) => self.delete(*count),
            Step::Enter => self.enter(),
            Step::Paste => self.paste(),
            Step::Copy(span) => self.copy(span),
            Step::Clear => self.clear(),
            Step::WaitForOutput { text, timeout_ms } => self.wait_for_output(text, *timeout_ms),
        }
    }

    fn interrupt(&mut self, index: usize) -> RunStatus {
        info!(step = index, "recording interrupted");
        RunStatus::Interrupted
    }

    fn abort(&mut self, index: usize, err: RunError) -> RunStatus {
        error!(step = index, kind = err.kind(), error = %err, "aborting run");
        let message = err.to_string();
        self.session.emit(&format!("\nERROR: {}", message));
        self.refresh();
        self.session.record_frame();
        RunStatus::Aborted(message)
    }

    // === Helpers shared by the handlers ===

    /// Mirror the current projection into the preview.
    fn refresh(&mut self) {
        let text = self.session.snapshot().text();
        self.preview.set_content(&text);
        if let Err(e) = self.preview.render() {
            debug!(error = %e, "preview render failed");
        }
    }

    /// Record `ms` worth of frames, then sleep for it if pacing in real time.
    fn delay(&mut self, ms: u64) {
        self.session.advance(ms);
        self.pace.sleep(ms);
    }

    fn interrupted(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            return true;
        }
        if self.preview.interrupted() {
            self.cancel.cancel();
            return true;
        }
        false
    }

    fn check_interrupt(&mut self) -> HandlerResult {
        if self.interrupted() {
            Err(Halt::Interrupted)
        } else {
            Ok(())
        }
    }
}
