//! Animated GIF renderer.
//!
//! Frames are rasterized onto a fixed canvas (background fill, one
//! monospace glyph per cell) in parallel batches, then encoded in order.
//! When no font can be loaded every visible character is drawn as a block
//! so the animation still shows where text appears.

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, PxScale};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Rgba, RgbaImage};
use once_cell::sync::OnceCell;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::layout::{cells, TextLayout};
use super::path::set_extension;
use super::{ensure_frames, init_error, render_error, write_artifact, Renderer, RendererKind};
use crate::config::{Config, CELL_WIDTH_PX};
use crate::error::RunError;
use crate::session::Frame;

/// Monospace fonts tried in order when no font file is configured.
const FONT_PATHS: &[(&str, u32)] = &[
    ("/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf", 0),
    ("/usr/share/fonts/TTF/DejaVuSansMono.ttf", 0),
    ("/usr/share/fonts/dejavu/DejaVuSansMono.ttf", 0),
    ("/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf", 0),
    ("/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf", 0),
    ("/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf", 0),
    ("/usr/share/fonts/noto/NotoSansMono-Regular.ttf", 0),
    ("/System/Library/Fonts/Menlo.ttc", 0),
    ("/System/Library/Fonts/SFNSMono.ttf", 0),
    ("C:\\Windows\\Fonts\\consola.ttf", 0),
];

/// Frames rasterized per parallel batch; bounds peak memory.
const RASTER_BATCH: usize = 64;

/// Inset of the block drawn for characters without a glyph.
const BLOCK_MARGIN: u32 = 2;

static SYSTEM_FONT: OnceCell<Option<(Vec<u8>, u32)>> = OnceCell::new();

fn system_font_data() -> Option<&'static (Vec<u8>, u32)> {
    SYSTEM_FONT
        .get_or_init(|| {
            for (path, index) in FONT_PATHS {
                if let Ok(data) = std::fs::read(path) {
                    info!(font_path = path, size = data.len(), "loaded monospace font");
                    return Some((data, *index));
                }
            }
            warn!("no system monospace font found, drawing blocks instead of glyphs");
            None
        })
        .as_ref()
}

pub struct GifRenderer {
    layout: TextLayout,
    background: [u8; 3],
    foreground: [u8; 3],
    font: Option<FontVec>,
    /// Exact frame duration as `numerator / denominator` milliseconds
    delay: (u32, u32),
    speed: i32,
    repeat: Repeat,
}

impl GifRenderer {
    pub fn new(config: &Config) -> Result<Self, RunError> {
        let kind = RendererKind::Gif;
        let layout = TextLayout::from_config(config);
        if layout.width == 0 || layout.height == 0 {
            return Err(init_error(kind, "canvas has zero width or height"));
        }
        let background = config.theme.background_rgb().map_err(|e| init_error(kind, e))?;
        let foreground = config.theme.foreground_rgb().map_err(|e| init_error(kind, e))?;

        let font = match &config.theme.font_path {
            Some(path) => {
                let data = std::fs::read(path).map_err(|e| {
                    init_error(kind, format!("cannot read font {}: {}", path.display(), e))
                })?;
                let font = FontVec::try_from_vec(data).map_err(|e| {
                    init_error(kind, format!("cannot parse font {}: {}", path.display(), e))
                })?;
                Some(font)
            }
            None => system_font_data().and_then(|(data, index)| {
                FontVec::try_from_vec_and_index(data.clone(), *index)
                    .map_err(|e| warn!(error = %e, "failed to parse system font"))
                    .ok()
            }),
        };

        let repeat = match config.animation.repeat {
            0 => Repeat::Infinite,
            n => Repeat::Finite(n),
        };

        Ok(Self {
            layout,
            background,
            foreground,
            font,
            delay: (1000, config.animation.fps.max(1)),
            speed: i32::from(config.animation.quality.clamp(1, 30)),
            repeat,
        })
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw one frame onto a fresh canvas.
    pub fn rasterize(&self, frame: &Frame) -> RgbaImage {
        let [r, g, b] = self.background;
        let mut img = RgbaImage::from_pixel(
            self.layout.width,
            self.layout.height,
            Rgba([r, g, b, 255]),
        );

        for (row, line) in frame.lines.iter().enumerate() {
            let baseline = self.layout.baseline(row);
            for cell in cells(line) {
                if cell.ch.is_whitespace() || cell.width == 0 {
                    continue;
                }
                let x = self.layout.column_x(cell.col);
                let drawn = match &self.font {
                    Some(font) => self.draw_glyph(&mut img, font, cell.ch, x, baseline),
                    None => false,
                };
                if !drawn {
                    let cell_w = CELL_WIDTH_PX * cell.width as u32;
                    let top = (baseline - self.layout.font_size) as u32;
                    self.draw_block(&mut img, x as u32, top, cell_w);
                }
            }
        }
        img
    }

    /// Returns false when the font has no glyph for `ch`.
    fn draw_glyph(
        &self,
        img: &mut RgbaImage,
        font: &FontVec,
        ch: char,
        x: f32,
        baseline: f32,
    ) -> bool {
        let glyph_id = font.glyph_id(ch);
        if glyph_id.0 == 0 {
            return false;
        }
        let glyph = glyph_id
            .with_scale_and_position(PxScale::from(self.layout.font_size), point(x, baseline));
        let Some(outlined) = font.outline_glyph(glyph) else {
            return true;
        };

        let bounds = outlined.px_bounds();
        let (width, height) = img.dimensions();
        outlined.draw(|gx, gy, coverage| {
            let px = bounds.min.x as i32 + gx as i32;
            let py = bounds.min.y as i32 + gy as i32;
            if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                return;
            }
            let alpha = (coverage.clamp(0.0, 1.0) * 255.0) as u8;
            if alpha == 0 {
                return;
            }
            let pixel = img.get_pixel_mut(px as u32, py as u32);
            let blended = alpha_blend(self.foreground, [pixel[0], pixel[1], pixel[2]], alpha);
            *pixel = Rgba([blended[0], blended[1], blended[2], 255]);
        });
        true
    }

    fn draw_block(&self, img: &mut RgbaImage, x: u32, top: u32, cell_w: u32) {
        let [r, g, b] = self.foreground;
        let cell_h = self.layout.line_height;
        let (width, height) = img.dimensions();
        for py in (top + BLOCK_MARGIN)..(top + cell_h.saturating_sub(BLOCK_MARGIN)) {
            for px in (x + BLOCK_MARGIN)..(x + cell_w.saturating_sub(BLOCK_MARGIN)) {
                if px < width && py < height {
                    img.put_pixel(px, py, Rgba([r, g, b, 255]));
                }
            }
        }
    }

    /// Encode `frames` into GIF bytes.
    pub fn encode(&self, frames: &[Frame]) -> Result<Vec<u8>, RunError> {
        let kind = RendererKind::Gif;
        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut bytes, self.speed);
            encoder
                .set_repeat(self.repeat)
                .map_err(|e| render_error(kind, e))?;

            for batch in frames.chunks(RASTER_BATCH) {
                let images: Vec<RgbaImage> =
                    batch.par_iter().map(|f| self.rasterize(f)).collect();
                for img in images {
                    let delay = Delay::from_numer_denom_ms(self.delay.0, self.delay.1);
                    encoder
                        .encode_frame(image::Frame::from_parts(img, 0, 0, delay))
                        .map_err(|e| render_error(kind, e))?;
                }
                debug!(frames = batch.len(), "encoded gif batch");
            }
        }
        Ok(bytes)
    }
}

impl Renderer for GifRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Gif
    }

    fn render(&self, frames: &[Frame], output: &Path) -> Result<PathBuf, RunError> {
        ensure_frames(RendererKind::Gif, frames)?;
        let path = set_extension(output, RendererKind::Gif.extension());
        let bytes = self.encode(frames)?;
        write_artifact(&path, &bytes)?;
        info!(
            path = %path.display(),
            frames = frames.len(),
            has_font = self.has_font(),
            "gif written"
        );
        Ok(path)
    }
}

/// Alpha blend foreground onto background
fn alpha_blend(fg: [u8; 3], bg: [u8; 3], alpha: u8) -> [u8; 3] {
    let a = u16::from(alpha);
    let inv_a = 255 - a;
    [
        ((u16::from(fg[0]) * a + u16::from(bg[0]) * inv_a) / 255) as u8,
        ((u16::from(fg[1]) * a + u16::from(bg[1]) * inv_a) / 255) as u8,
        ((u16::from(fg[2]) * a + u16::from(bg[2]) * inv_a) / 255) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifDecoder;
    use image::AnimationDecoder;
    use std::io::Cursor;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.dimensions.width = 120;
        config.animation.line_count = 3;
        config.animation.quality = 30;
        config
    }

    fn decode(bytes: &[u8]) -> Vec<image::Frame> {
        GifDecoder::new(Cursor::new(bytes))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap()
    }

    #[test]
    fn canvas_matches_config() {
        let renderer = GifRenderer::new(&small_config()).unwrap();
        let img = renderer.rasterize(&Frame::new(vec!["hi".to_string()]));
        assert_eq!(img.dimensions(), (120, 100));
    }

    #[test]
    fn empty_frame_is_background_only() {
        let renderer = GifRenderer::new(&small_config()).unwrap();
        let img = renderer.rasterize(&Frame::default());
        assert!(img.pixels().all(|p| p.0 == [0x1e, 0x1e, 0x2e, 255]));
    }

    #[test]
    fn text_changes_pixels() {
        let renderer = GifRenderer::new(&small_config()).unwrap();
        let blank = renderer.rasterize(&Frame::new(vec![String::new()]));
        let text = renderer.rasterize(&Frame::new(vec!["#".to_string()]));
        assert_ne!(blank, text);
    }

    #[test]
    fn encoded_gif_has_one_frame_per_input_frame() {
        let renderer = GifRenderer::new(&small_config()).unwrap();
        let frames = vec![
            Frame::new(vec!["a".to_string()]),
            Frame::new(vec!["ab".to_string()]),
            Frame::new(vec!["ab".to_string()]),
        ];
        let decoded = decode(&renderer.encode(&frames).unwrap());
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].buffer().dimensions(), (120, 100));
        let (num, den) = decoded[0].delay().numer_denom_ms();
        assert_eq!(num / den, 100);
        assert_eq!(decoded[1].buffer(), decoded[2].buffer());
    }

    #[test]
    fn missing_font_file_fails_at_construction() {
        let mut config = small_config();
        config.theme.font_path = Some("/nonexistent/font.ttf".into());
        let err = GifRenderer::new(&config).err().unwrap();
        assert_eq!(err.kind(), "renderer-init");
    }

    #[test]
    fn render_writes_gif_extension() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = GifRenderer::new(&small_config()).unwrap();
        let path = renderer
            .render(
                &[Frame::new(vec!["x".to_string()])],
                &dir.path().join("out.cast"),
            )
            .unwrap();
        assert_eq!(path, dir.path().join("out.gif"));
        assert_eq!(&std::fs::read(path).unwrap()[..3], b"GIF");
    }

    #[test]
    fn alpha_blend_extremes() {
        assert_eq!(alpha_blend([255, 255, 255], [0, 0, 0], 255), [255, 255, 255]);
        assert_eq!(alpha_blend([255, 255, 255], [0, 0, 0], 0), [0, 0, 0]);
    }
}
