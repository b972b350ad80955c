//! Text placement shared by the pixel and vector renderers, so both put a
//! given character of a given frame at the same spot on the canvas.

use unicode_width::UnicodeWidthChar;

use crate::config::{Config, CELL_WIDTH_PX};

/// Canvas geometry derived from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    pub width: u32,
    pub height: u32,
    pub padding_x: u32,
    pub padding_y: u32,
    pub line_height: u32,
    pub font_size: f32,
}

impl TextLayout {
    pub fn from_config(config: &Config) -> Self {
        Self {
            width: config.dimensions.width,
            height: config.height_px(),
            padding_x: config.dimensions.padding_x,
            padding_y: config.dimensions.padding_y,
            line_height: config.dimensions.line_height,
            font_size: config.dimensions.font_size,
        }
    }

    /// Baseline of visible row `row` (0 is the top row).
    pub fn baseline(&self, row: usize) -> f32 {
        let line_height = self.line_height as f32;
        self.padding_y as f32 + row as f32 * line_height + 0.8 * line_height
    }

    /// Left edge of column `col`.
    pub fn column_x(&self, col: usize) -> f32 {
        self.padding_x as f32 + (col as u32 * CELL_WIDTH_PX) as f32
    }
}

/// A character placed on the cell grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub col: usize,
    pub ch: char,
    /// Cells taken: 2 for wide characters, 0 for combining marks
    pub width: usize,
}

/// Place the characters of `line` on the cell grid.
pub fn cells(line: &str) -> Vec<Cell> {
    let mut col = 0;
    line.chars()
        .map(|ch| {
            let width = ch.width().unwrap_or(0);
            let cell = Cell { col, ch, width };
            col += width;
            cell
        })
        .collect()
}
