//! Step scripts.
//!
//! A script is a JSON array of `{action, payload?, timeoutMs?}` records. The
//! records are kept raw after loading and converted to a typed [`Step`] only
//! when the interpreter reaches them, so a bad step fails at its own position
//! in the run and every earlier step still shows up in the recording.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RunError;

/// Default `waitForOutput` timeout.
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5000;

/// Errors while reading a script file.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A step exactly as written in the script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStep {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, alias = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl RawStep {
    pub fn new(action: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            action: action.into(),
            payload,
            timeout_ms: None,
        }
    }
}

/// An ordered list of raw steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub steps: Vec<RawStep>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Inclusive text span for `copy`. Lines are 1-indexed, positions are
/// 0-indexed character offsets within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopySpan {
    pub start_line: usize,
    pub start_pos: usize,
    pub end_line: usize,
    pub end_pos: usize,
}

/// A validated step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Type(String),
    Delete(usize),
    Enter,
    Paste,
    Copy(CopySpan),
    Clear,
    WaitForOutput { text: String, timeout_ms: u64 },
}

impl Step {
    /// Action tag as written in scripts.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Type(_) => "type",
            Step::Delete(_) => "delete",
            Step::Enter => "enter",
            Step::Paste => "paste",
            Step::Copy(_) => "copy",
            Step::Clear => "clear",
            Step::WaitForOutput { .. } => "waitForOutput",
        }
    }
}

impl TryFrom<&RawStep> for Step {
    type Error = RunError;

    fn try_from(raw: &RawStep) -> Result<Self, Self::Error> {
        let payload = raw.payload.as_ref();
        match raw.action.as_str() {
            "type" => Ok(Step::Type(text_payload("type", payload)?)),
            "delete" => {
                let count = payload
                    .and_then(Value::as_u64)
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| {
                        RunError::invalid_payload(
                            "delete",
                            format!("expected a non-negative integer, got {}", describe(payload)),
                        )
                    })?;
                Ok(Step::Delete(count))
            }
            "enter" => Ok(Step::Enter),
            "paste" => Ok(Step::Paste),
            "copy" => Ok(Step::Copy(copy_payload(payload)?)),
            "clear" => Ok(Step::Clear),
            "waitForOutput" => Ok(Step::WaitForOutput {
                text: text_payload("waitForOutput", payload)?,
                timeout_ms: raw.timeout_ms.unwrap_or(DEFAULT_WAIT_TIMEOUT_MS),
            }),
            other => Err(RunError::UnknownAction(other.to_string())),
        }
    }
}

fn describe(payload: Option<&Value>) -> String {
    payload.map_or_else(|| "nothing".to_string(), Value::to_string)
}

/// Strings are taken as-is; numbers and booleans are stringified.
fn text_payload(action: &'static str, payload: Option<&Value>) -> Result<String, RunError> {
    match payload {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
        other => Err(RunError::invalid_payload(
            action,
            format!("expected text, got {}", describe(other)),
        )),
    }
}

fn copy_payload(payload: Option<&Value>) -> Result<CopySpan, RunError> {
    let faulty = || {
        RunError::invalid_payload(
            "copy",
            format!(
                "expected {{startLine, startPos, endLine, endPos}}, got {}",
                describe(payload)
            ),
        )
    };
    let object = payload.and_then(Value::as_object).ok_or_else(faulty)?;
    let field = |name: &str| {
        object
            .get(name)
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(faulty)
    };
    let span = CopySpan {
        start_line: field("startLine")?,
        start_pos: field("startPos")?,
        end_line: field("endLine")?,
        end_pos: field("endPos")?,
    };
    if span.start_line == 0 {
        return Err(RunError::invalid_payload(
            "copy",
            "startLine is 1-indexed and must be at least 1",
        ));
    }
    Ok(span)
}
