//! Errors that end a recording run.
//!
//! Every variant is terminal for the run but not for the artifact: the
//! interpreter catches them once, writes the message into the transcript and
//! still finalizes the recording.

/// Errors raised while interpreting steps or producing the artifact.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Faulty payload for '{action}': {detail}")]
    InvalidPayload { action: &'static str, detail: String },

    #[error("Timeout waiting for output: \"{text}\" ({timeout_ms}ms)")]
    Timeout { text: String, timeout_ms: u64 },

    #[error("Command '{command}' failed: {message}")]
    Exec { command: String, message: String },

    #[error("Renderer '{renderer}' could not be initialized: {message}")]
    RendererInit {
        renderer: &'static str,
        message: String,
    },

    #[error("Renderer '{renderer}' failed: {message}")]
    Render {
        renderer: &'static str,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunError {
    pub(crate) fn invalid_payload(action: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidPayload {
            action,
            detail: detail.into(),
        }
    }

    pub(crate) fn exec(command: &str, message: impl ToString) -> Self {
        Self::Exec {
            command: command.to_string(),
            message: message.to_string(),
        }
    }

    /// Short machine-friendly name of the error kind (used in logs).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownAction(_) => "unknown-action",
            Self::InvalidPayload { .. } => "invalid-payload",
            Self::Timeout { .. } => "timeout",
            Self::Exec { .. } => "exec",
            Self::RendererInit { .. } => "renderer-init",
            Self::Render { .. } => "render",
            Self::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_message_names_the_action() {
        let err = RunError::UnknownAction("teleport".to_string());
        assert_eq!(err.to_string(), "Unknown action: teleport");
        assert_eq!(err.kind(), "unknown-action");
    }

    #[test]
    fn timeout_message_quotes_the_text() {
        let err = RunError::Timeout {
            text: "READY".to_string(),
            timeout_ms: 200,
        };
        assert!(err.to_string().contains("\"READY\""));
        assert!(err.to_string().contains("200ms"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RunError = io.into();
        assert_eq!(err.kind(), "io");
    }
}
