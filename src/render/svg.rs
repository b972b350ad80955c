//! Self-animating SVG.
//!
//! Every frame is a hidden `<text>` block with two SMIL animations: `enter`
//! shows it when the previous frame's `leave` ends, `leave` hides it one
//! frame duration later. The first frame also restarts when the last one
//! leaves, so the document loops without any scripting.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::layout::TextLayout;
use super::path::set_extension;
use super::{ensure_frames, write_artifact, Renderer, RendererKind};
use crate::config::Config;
use crate::error::RunError;
use crate::session::Frame;

/// Duration of the opacity switch itself.
const SWITCH_DUR: &str = "0.000001s";

pub struct SvgRenderer {
    layout: TextLayout,
    seconds_per_frame: String,
    background: String,
    foreground: String,
    font_family: String,
}

impl SvgRenderer {
    pub fn new(config: &Config) -> Result<Self, RunError> {
        let [br, bg, bb] = config
            .theme
            .background_rgb()
            .map_err(|e| super::init_error(RendererKind::Svg, e))?;
        let [fr, fg, fb] = config
            .theme
            .foreground_rgb()
            .map_err(|e| super::init_error(RendererKind::Svg, e))?;

        Ok(Self {
            layout: TextLayout::from_config(config),
            seconds_per_frame: format_seconds(config.ms_per_frame() / 1000.0),
            background: format!("#{:02x}{:02x}{:02x}", br, bg, bb),
            foreground: format!("#{:02x}{:02x}{:02x}", fr, fg, fb),
            font_family: config.theme.font_family.clone(),
        })
    }

    /// Build the complete document.
    pub fn document(&self, frames: &[Frame]) -> String {
        let TextLayout { width, height, .. } = self.layout;
        let mut out = String::new();

        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = width,
            h = height
        );
        let _ = writeln!(
            out,
            "<style>.frame {{ fill: {}; font-family: {}; font-size: {}px; }}</style>",
            self.foreground,
            escape_xml(&self.font_family),
            self.layout.font_size
        );
        let _ = writeln!(
            out,
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            self.background
        );

        let last = frames.len().saturating_sub(1);
        for (index, frame) in frames.iter().enumerate() {
            let enter_begin = if index == 0 {
                format!("0s; frame{}leave.end", last)
            } else {
                format!("frame{}leave.end", index - 1)
            };
            let _ = writeln!(out, r#"<text class="frame" opacity="0">"#);
            let _ = writeln!(
                out,
                r#"<animate id="frame{i}enter" attributeName="opacity" from="0" to="1" begin="{begin}" dur="{dur}" fill="freeze"/>"#,
                i = index,
                begin = enter_begin,
                dur = SWITCH_DUR
            );
            let _ = writeln!(
                out,
                r#"<animate id="frame{i}leave" attributeName="opacity" from="1" to="0" begin="frame{i}enter.end+{spf}s" dur="{dur}" fill="freeze"/>"#,
                i = index,
                spf = &self.seconds_per_frame,
                dur = SWITCH_DUR
            );
            for (row, line) in frame.lines.iter().enumerate() {
                let _ = writeln!(
                    out,
                    r#"<tspan x="{}" y="{}" xml:space="preserve">{}</tspan>"#,
                    self.layout.column_x(0),
                    self.layout.baseline(row),
                    escape_xml(line)
                );
            }
            let _ = writeln!(out, "</text>");
        }

        out.push_str("</svg>\n");
        out
    }
}

impl Renderer for SvgRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Svg
    }

    fn render(&self, frames: &[Frame], output: &Path) -> Result<PathBuf, RunError> {
        ensure_frames(RendererKind::Svg, frames)?;
        let path = set_extension(output, RendererKind::Svg.extension());
        write_artifact(&path, self.document(frames).as_bytes())?;
        tracing::info!(path = %path.display(), frames = frames.len(), "svg written");
        Ok(path)
    }
}

/// Escape text for use in XML content and attribute values. Characters XML
/// 1.0 cannot carry (C0 controls other than tab and line breaks) are dropped.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(ch),
            '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Seconds with four decimals and no trailing zeros.
fn format_seconds(value: f64) -> String {
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() {
        "0".to_string()
    } else {
        text.to_string()
    }
}
