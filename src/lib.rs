//! termreel - scripted terminal demo recorder
//!
//! Replays a JSON script of terminal actions (typing, deleting, running
//! commands, copy/paste) against a simulated terminal, samples it into a
//! deterministic frame sequence and renders that as a GIF, an SVG or an
//! asciicast recording.

pub mod asciicast;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod interpreter;
pub mod pace;
pub mod preview;
pub mod recorder;
pub mod render;
pub mod script;
pub mod session;

pub use config::Config;
pub use error::RunError;
pub use interpreter::{CancelFlag, Interpreter, RunStatus};
pub use recorder::{Recorder, Recording};
pub use render::{Renderer, RendererKind};
pub use script::{RawStep, Script, Step};
pub use session::{Frame, Session};
