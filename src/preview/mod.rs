//! Live preview of the session being recorded.
//!
//! The interpreter mirrors every projection update into a [`Preview`] and
//! asks it whether the user pressed an interrupt key. What the preview draws
//! has no effect on the recorded frames.

mod tui;

use std::io;

pub use tui::{centered_rect, TuiPreview};

/// A viewport that mirrors the simulated terminal.
pub trait Preview {
    /// Replace the displayed text.
    fn set_content(&mut self, text: &str);

    /// Draw the current content.
    fn render(&mut self) -> io::Result<()>;

    /// Whether the user asked to stop the run. Implementations drain their
    /// pending input here.
    fn interrupted(&mut self) -> bool {
        false
    }
}

/// Preview for headless runs: remembers the content and draws nothing.
#[derive(Debug, Default, Clone)]
pub struct NullPreview {
    content: String,
    renders: usize,
}

impl NullPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of `render` calls so far.
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl Preview for NullPreview {
    fn set_content(&mut self, text: &str) {
        self.content.clear();
        self.content.push_str(text);
    }

    fn render(&mut self) -> io::Result<()> {
        self.renders += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_preview_tracks_content_and_renders() {
        let mut preview = NullPreview::new();
        preview.set_content("one");
        preview.set_content("two");
        preview.render().unwrap();
        assert_eq!(preview.content(), "two");
        assert_eq!(preview.renders(), 1);
        assert!(!preview.interrupted());
    }
}
