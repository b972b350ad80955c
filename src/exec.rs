//! Command execution bridge.
//!
//! Runs a command through the platform shell and streams its stdout and
//! stderr back as text chunks. Each stream is drained by its own reader
//! thread; both feed a single channel so the caller sees one ordered
//! sequence of chunks and stays the only writer of session state.

use std::ffi::OsString;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::RunError;

const READ_BUFFER_SIZE: usize = 4096;

enum Message {
    Chunk(String),
    Eof,
}

/// Result of waiting for the next chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    Chunk(String),
    /// Nothing arrived within the wait interval; the command is still running
    Pending,
    /// Both output streams are closed
    Closed,
}

/// A running command whose output is being streamed.
pub struct CommandStream {
    command: String,
    child: Child,
    rx: Receiver<Message>,
    open_streams: usize,
    readers: Vec<JoinHandle<()>>,
}

impl CommandStream {
    /// Spawn `command` with exactly the given environment.
    pub fn spawn(command: &str, environment: &[(OsString, OsString)]) -> Result<Self, RunError> {
        let mut child = shell_command(command)
            .env_clear()
            .envs(environment.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RunError::exec(command, e))?;

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr, tx));
        }

        tracing::debug!(command, pid = child.id(), "spawned command");

        Ok(Self {
            command: command.to_string(),
            open_streams: readers.len(),
            child,
            rx,
            readers,
        })
    }

    /// Wait up to `timeout` for the next output chunk.
    pub fn next_chunk(&mut self, timeout: Duration) -> Next {
        loop {
            if self.open_streams == 0 {
                return Next::Closed;
            }
            match self.rx.recv_timeout(timeout) {
                Ok(Message::Chunk(text)) => return Next::Chunk(text),
                Ok(Message::Eof) => self.open_streams -= 1,
                Err(RecvTimeoutError::Timeout) => return Next::Pending,
                Err(RecvTimeoutError::Disconnected) => {
                    self.open_streams = 0;
                }
            }
        }
    }

    /// Wait for the process to exit. A non-zero exit code is a normal
    /// outcome; termination by a signal is reported as an error.
    pub fn wait(mut self) -> Result<ExitStatus, RunError> {
        let status = self
            .child
            .wait()
            .map_err(|e| RunError::exec(&self.command, e))?;
        self.join_readers();

        if status.code().is_none() {
            return Err(RunError::exec(
                &self.command,
                format!("terminated abnormally ({})", status),
            ));
        }
        tracing::debug!(command = %self.command, %status, "command exited");
        Ok(status)
    }

    /// Kill the command with everything it started and reap the shell.
    ///
    /// The reader threads are not joined: a process that escaped the group
    /// may still hold the pipes open. Dropping the receiver makes the
    /// readers stop at their next chunk.
    pub fn kill(mut self) {
        if let Err(e) = kill_process_group(&mut self.child) {
            tracing::debug!(command = %self.command, error = %e, "kill failed");
        }
        let _ = self.child.wait();
        self.readers.clear();
    }

    fn join_readers(&mut self) {
        for reader in self.readers.drain(..) {
            let _ = reader.join();
        }
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    use std::os::unix::process::CommandExt;

    let mut cmd = Command::new("sh");
    // Own process group, so pipelines and background jobs can be killed together
    cmd.arg("-c").arg(command).process_group(0);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(unix)]
fn kill_process_group(child: &mut Child) -> std::io::Result<()> {
    let pgid = libc::pid_t::try_from(child.id())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    // SAFETY: killpg only sends a signal; the group id is the shell's pid
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } == 0 {
        Ok(())
    } else {
        // The group may already be gone; fall back to the shell itself
        child.kill()
    }
}

#[cfg(windows)]
fn kill_process_group(child: &mut Child) -> std::io::Result<()> {
    child.kill()
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R, tx: Sender<Message>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut decoder = Utf8Decoder::default();
        let mut buf = [0u8; READ_BUFFER_SIZE];
        loop {
            match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    let text = decoder.push(&buf[..n]);
                    // Receiver gone means the command was abandoned
                    if !text.is_empty() && tx.send(Message::Chunk(text)).is_err() {
                        return;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        let rest = decoder.finish();
        if !rest.is_empty() {
            let _ = tx.send(Message::Chunk(rest));
        }
        let _ = tx.send(Message::Eof);
    })
}

/// Incremental UTF-8 decoding that holds back a multi-byte sequence split
/// across reads. Invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    out.push_str(valid);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid_up_to]));
                    match e.error_len() {
                        // Incomplete sequence at the end: keep it for the next read
                        None => {
                            self.pending.drain(..valid_up_to);
                            return out;
                        }
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid_up_to + len);
                        }
                    }
                }
            }
        }
    }

    /// Flush whatever is left, replacing a truncated sequence.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Normalize command output line endings to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "")
}
