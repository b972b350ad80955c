//! One handler per action kind.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::{Halt, HandlerResult, Interpreter};
use crate::error::RunError;
use crate::exec::{normalize_newlines, CommandStream, Next};
use crate::script::CopySpan;

/// Pause after `enter`, `paste`, `clear` and after a command exits.
pub(crate) const STEP_SETTLE_MS: u64 = 1000;
/// Interval between `waitForOutput` polls.
pub(crate) const WAIT_POLL_MS: u64 = 1000;
/// How long to block on command output before re-checking for interrupts.
const COMMAND_POLL: Duration = Duration::from_millis(100);

impl Interpreter<'_> {
    pub(super) fn type_text(&mut self, text: &str) -> HandlerResult {
        let mut utf8 = [0u8; 4];
        for ch in text.chars() {
            self.check_interrupt()?;
            self.session.type_str(ch.encode_utf8(&mut utf8));
            self.refresh();
            let ms = self.rhythm.keystroke();
            self.delay(ms);
        }
        Ok(())
    }

    pub(super) fn delete(&mut self, count: usize) -> HandlerResult {
        for _ in 0..count {
            self.check_interrupt()?;
            if self.session.delete_trailing(1) == 0 {
                break;
            }
            self.refresh();
            let ms = self.rhythm.backspace();
            self.delay(ms);
        }
        Ok(())
    }

    pub(super) fn enter(&mut self) -> HandlerResult {
        let command = self.session.take_pending();
        self.session.emit("\n");
        self.refresh();
        self.delay(STEP_SETTLE_MS);

        if command.is_empty() {
            return Ok(());
        }
        if !self.execute_commands {
            debug!(%command, "command execution disabled, skipping");
            return Ok(());
        }
        self.run_command(&command)
    }

    pub(super) fn paste(&mut self) -> HandlerResult {
        let text = self.session.clipboard().to_string();
        self.session.type_str(&text);
        self.refresh();
        self.delay(STEP_SETTLE_MS);
        Ok(())
    }

    pub(super) fn copy(&mut self, span: &CopySpan) -> HandlerResult {
        let text = self.session.copy_span(span);
        debug!(chars = text.chars().count(), "copied to internal clipboard");
        self.session.set_clipboard(text);
        Ok(())
    }

    pub(super) fn clear(&mut self) -> HandlerResult {
        self.type_text("clear")?;
        self.session.clear();
        self.refresh();
        self.delay(STEP_SETTLE_MS);
        Ok(())
    }

    pub(super) fn wait_for_output(&mut self, text: &str, timeout_ms: u64) -> HandlerResult {
        let mut waited = 0;
        loop {
            if self.session.buffer().contains(text) {
                debug!(text, waited_ms = waited, "output found");
                return Ok(());
            }
            if waited >= timeout_ms {
                return Err(RunError::Timeout {
                    text: text.to_string(),
                    timeout_ms,
                }
                .into());
            }
            self.check_interrupt()?;
            self.delay(WAIT_POLL_MS);
            waited += WAIT_POLL_MS;
        }
    }

    /// Stream a command's output into the session. Each chunk advances the
    /// clock by the wall time since the previous chunk (at least one frame),
    /// so slow output stays slow in the recording.
    fn run_command(&mut self, command: &str) -> HandlerResult {
        let mut stream = CommandStream::spawn(command, self.session.environment())?;
        let mut last_chunk = Instant::now();

        loop {
            if self.interrupted() {
                info!(command, "interrupt while command running, killing it");
                stream.kill();
                return Err(Halt::Interrupted);
            }
            match stream.next_chunk(COMMAND_POLL) {
                Next::Chunk(text) => {
                    self.session.emit(&normalize_newlines(&text));
                    self.refresh();
                    let gap = u64::try_from(last_chunk.elapsed().as_millis()).unwrap_or(u64::MAX);
                    last_chunk = Instant::now();
                    self.session.advance(gap.max(self.session.frame_ms()));
                }
                Next::Pending => {}
                Next::Closed => break,
            }
        }

        stream.wait()?;
        self.session.emit("\n");
        self.refresh();
        self.delay(STEP_SETTLE_MS);
        Ok(())
    }
}
