//! Boxed terminal preview using ratatui/crossterm.
//!
//! Takes over the terminal (raw mode + alternate screen) for the lifetime of
//! the value and restores it on drop. Esc, `q` and Ctrl+C request an
//! interrupt; raw mode swallows SIGINT, so the keys are the only way in.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Terminal,
};

use super::Preview;

/// Live preview drawn in a centered, bordered box.
pub struct TuiPreview {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    content: String,
    title: String,
}

impl TuiPreview {
    pub fn new(title: impl Into<String>) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            content: String::new(),
            title: title.into(),
        })
    }
}

impl Preview for TuiPreview {
    fn set_content(&mut self, text: &str) {
        self.content.clear();
        self.content.push_str(text);
    }

    fn render(&mut self) -> io::Result<()> {
        let title = format!(" {} (Esc/q to stop) ", self.title);
        let paragraph = Paragraph::new(self.content.as_str())
            .style(Style::default().fg(Color::White))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Gray))
                    .title(title),
            );

        self.terminal.draw(|frame| {
            let area = centered_rect(80, 80, frame.area());
            frame.render_widget(Clear, area);
            frame.render_widget(paragraph, area);
        })?;
        Ok(())
    }

    fn interrupted(&mut self) -> bool {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => return false,
                Err(e) => {
                    tracing::warn!(error = %e, "preview input polling failed");
                    return false;
                }
            }
            let Ok(Event::Key(key)) = event::read() else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let stop = match key.code {
                KeyCode::Esc | KeyCode::Char('q') => true,
                KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
                _ => false,
            };
            if stop {
                return true;
            }
        }
    }
}

impl Drop for TuiPreview {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Create a centered layout with the given constraints.
///
/// Returns the center area that can be used for content.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical_layout[1])[1]
}
