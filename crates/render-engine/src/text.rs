//! Label text rasterization.
//!
//! Glyph coverage from `rusttype` is blended source-over onto the RGBA frame.
//! Text is positioned by its baseline-left point, the same anchor the editor
//! uses when placing a label.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use rusttype::{point, Font, Scale};

use reelmark_common::config::LabelDefaults;
use reelmark_common::error::{ReelmarkError, ReelmarkResult};

/// Padding around text when a background box is drawn, as a fraction of the
/// font size.
const BACKGROUND_PADDING: f32 = 0.2;

/// Font files tried when no font is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Pixel extent of a laid-out string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Horizontal advance from the baseline origin.
    pub width: f32,
    /// Distance from baseline to the top of the tallest glyph (positive).
    pub ascent: f32,
    /// Distance from baseline to the lowest descender (positive).
    pub descent: f32,
}

impl TextMetrics {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Draws label text onto frames with a single loaded font.
pub struct LabelRasterizer {
    font: Font<'static>,
    source: PathBuf,
}

impl std::fmt::Debug for LabelRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelRasterizer")
            .field("source", &self.source)
            .finish()
    }
}

impl LabelRasterizer {
    /// Load a TrueType/OpenType font file.
    pub fn load(path: &Path) -> ReelmarkResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            ReelmarkError::font(format!("Failed to read font {}: {e}", path.display()))
        })?;
        Self::from_bytes(bytes, path.to_path_buf())
    }

    /// Build from in-memory font data. `source` is only used for diagnostics.
    pub fn from_bytes(bytes: Vec<u8>, source: PathBuf) -> ReelmarkResult<Self> {
        let font = Font::try_from_vec(bytes).ok_or_else(|| {
            ReelmarkError::font(format!("Unsupported font file: {}", source.display()))
        })?;
        Ok(Self { font, source })
    }

    /// Load the configured font, falling back to well-known system fonts.
    pub fn discover(defaults: &LabelDefaults) -> ReelmarkResult<Self> {
        if let Some(path) = &defaults.font_path {
            return Self::load(path);
        }

        for candidate in SYSTEM_FONT_CANDIDATES {
            let path = Path::new(candidate);
            if !path.is_file() {
                continue;
            }
            match Self::load(path) {
                Ok(rasterizer) => {
                    tracing::debug!(font = %path.display(), "Using system font");
                    return Ok(rasterizer);
                }
                Err(err) => tracing::warn!(font = %path.display(), error = %err, "Skipping font"),
            }
        }

        Err(ReelmarkError::font(
            "No usable font found; set labels.font_path in the config file",
        ))
    }

    /// Path the font was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Measure `text` at `px` pixels.
    pub fn measure(&self, text: &str, px: f32) -> TextMetrics {
        let scale = Scale::uniform(px.max(0.0));
        let v = self.font.v_metrics(scale);
        let width = self
            .font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        TextMetrics {
            width,
            ascent: v.ascent,
            descent: -v.descent,
        }
    }

    /// Blend `text` onto `image` with its baseline starting at `(x, y)`.
    ///
    /// Glyphs falling outside the image are clipped.
    pub fn draw(&self, image: &mut RgbaImage, text: &str, x: f32, y: f32, px: f32, color: [u8; 4]) {
        if text.is_empty() || px <= 0.0 || color[3] == 0 {
            return;
        }
        let scale = Scale::uniform(px);
        let (width, height) = image.dimensions();

        for glyph in self.font.layout(text, scale, point(x, y)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            if bb.max.x < 0 || bb.max.y < 0 || bb.min.x >= width as i32 || bb.min.y >= height as i32
            {
                continue;
            }
            glyph.draw(|gx, gy, coverage| {
                let px_x = bb.min.x + gx as i32;
                let px_y = bb.min.y + gy as i32;
                if px_x < 0 || px_y < 0 || px_x >= width as i32 || px_y >= height as i32 {
                    return;
                }
                let alpha = coverage.clamp(0.0, 1.0) * color[3] as f32 / 255.0;
                blend_pixel(image.get_pixel_mut(px_x as u32, px_y as u32), color, alpha);
            });
        }
    }

    /// Fill a padded box behind where `text` would be drawn at `(x, y)`.
    pub fn draw_background(
        &self,
        image: &mut RgbaImage,
        text: &str,
        x: f32,
        y: f32,
        px: f32,
        color: [u8; 4],
    ) {
        if text.is_empty() || px <= 0.0 || color[3] == 0 {
            return;
        }
        let metrics = self.measure(text, px);
        let pad = px * BACKGROUND_PADDING;
        let left = (x - pad).floor() as i32;
        let top = (y - metrics.ascent - pad).floor() as i32;
        let w = (metrics.width + 2.0 * pad).ceil().max(1.0) as u32;
        let h = (metrics.height() + 2.0 * pad).ceil().max(1.0) as u32;

        if color[3] == 255 {
            draw_filled_rect_mut(image, Rect::at(left, top).of_size(w, h), Rgba(color));
            return;
        }

        let (img_w, img_h) = image.dimensions();
        let x0 = left.max(0) as u32;
        let y0 = top.max(0) as u32;
        let x1 = (left + w as i32).clamp(0, img_w as i32) as u32;
        let y1 = (top + h as i32).clamp(0, img_h as i32) as u32;
        let alpha = color[3] as f32 / 255.0;
        for py in y0..y1 {
            for px_x in x0..x1 {
                blend_pixel(image.get_pixel_mut(px_x, py), color, alpha);
            }
        }
    }
}

/// Source-over blend of an opaque `color` at `alpha` onto `dst`.
fn blend_pixel(dst: &mut Rgba<u8>, color: [u8; 4], alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    let inv = 1.0 - alpha;
    for c in 0..3 {
        dst.0[c] = (color[c] as f32 * alpha + dst.0[c] as f32 * inv).round() as u8;
    }
    let dst_a = dst.0[3] as f32 / 255.0;
    dst.0[3] = ((alpha + dst_a * inv) * 255.0).round().min(255.0) as u8;
}
