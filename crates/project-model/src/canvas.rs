//! Editor canvas geometry.
//!
//! Labels are authored against a fixed-size editor canvas (640x360 by
//! default). At export time every label coordinate is mapped from the canvas
//! into the output frame, stretching independently on each axis the same way
//! the source frame is stretched onto the canvas for preview.

use serde::{Deserialize, Serialize};

/// Dimensions of a raster surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// The editor's default preview canvas.
    pub const EDITOR_DEFAULT: CanvasSize = CanvasSize {
        width: 640,
        height: 360,
    };

    /// Create a canvas size; zero dimensions are raised to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Width-to-height ratio.
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    /// Whether both dimensions are even (required by yuv420p encoders).
    pub fn is_even(&self) -> bool {
        self.width % 2 == 0 && self.height % 2 == 0
    }

    /// Round both dimensions down to the nearest even value (minimum 2).
    pub fn to_even(self) -> Self {
        Self {
            width: (self.width & !1).max(2),
            height: (self.height & !1).max(2),
        }
    }

    /// Clamp a point to lie within the canvas bounds.
    pub fn clamp_point(&self, x: f64, y: f64) -> (f64, f64) {
        let x = if x.is_finite() { x } else { 0.0 };
        let y = if y.is_finite() { y } else { 0.0 };
        (
            x.clamp(0.0, self.width as f64),
            y.clamp(0.0, self.height as f64),
        )
    }

    /// Whether a point lies within the canvas bounds (edges included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width as f64).contains(&x) && (0.0..=self.height as f64).contains(&y)
    }

    /// Map a point in this canvas into `target` coordinates.
    pub fn map_to(&self, target: CanvasSize, x: f64, y: f64) -> (f64, f64) {
        (
            x * target.width as f64 / self.width.max(1) as f64,
            y * target.height as f64 / self.height.max(1) as f64,
        )
    }

    /// Scale factor applied to font sizes when mapping into `target`.
    ///
    /// Text scales with the vertical axis so that a label keeps its height
    /// relative to the frame.
    pub fn scale_to(&self, target: CanvasSize) -> f64 {
        target.height as f64 / self.height.max(1) as f64
    }

    /// Largest size with this aspect ratio fitting within `max_w x max_h`,
    /// rounded down to even dimensions.
    pub fn fit_within(&self, max_w: u32, max_h: u32) -> CanvasSize {
        let max_w = max_w.max(2);
        let max_h = max_h.max(2);
        let aspect = self.aspect();
        let (w, h) = if max_w as f64 / max_h as f64 > aspect {
            ((max_h as f64 * aspect).round() as u32, max_h)
        } else {
            (max_w, (max_w as f64 / aspect).round() as u32)
        };
        CanvasSize::new(w.min(max_w), h.min(max_h)).to_even()
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::EDITOR_DEFAULT
    }
}

impl std::fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
