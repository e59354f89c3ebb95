//! Text labels placed on the editor canvas.
//!
//! A label's `(x, y)` is the left end of its text baseline in editor-canvas
//! pixels, matching how a 2D canvas positions `fillText`. A label may be
//! limited to a window of the source timeline; outside that window it is not
//! drawn.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::canvas::CanvasSize;

/// A user-positioned text annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Unique identifier within the project.
    pub id: String,

    /// Text to draw.
    pub text: String,

    /// Baseline-left X in editor-canvas pixels.
    pub x: f64,

    /// Baseline Y in editor-canvas pixels.
    pub y: f64,

    /// Visual style.
    #[serde(default)]
    pub style: LabelStyle,

    /// Source time (seconds) at which the label appears. `None` = from the start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_secs: Option<f64>,

    /// Source time (seconds) at which the label disappears. `None` = until the end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_secs: Option<f64>,
}

impl Label {
    /// Create a label at a canvas position, clamped to the canvas bounds.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        x: f64,
        y: f64,
        canvas: CanvasSize,
    ) -> Self {
        let (x, y) = canvas.clamp_point(x, y);
        Self {
            id: id.into(),
            text: text.into(),
            x,
            y,
            style: LabelStyle::default(),
            start_secs: None,
            end_secs: None,
        }
    }

    /// Builder-style style override.
    pub fn with_style(mut self, style: LabelStyle) -> Self {
        self.style = style;
        self
    }

    /// Builder-style visibility window.
    pub fn with_window(mut self, start_secs: Option<f64>, end_secs: Option<f64>) -> Self {
        self.start_secs = start_secs;
        self.end_secs = end_secs;
        self
    }

    /// Move the label, clamping to the canvas bounds.
    pub fn move_to(&mut self, x: f64, y: f64, canvas: CanvasSize) {
        let (x, y) = canvas.clamp_point(x, y);
        self.x = x;
        self.y = y;
    }

    /// Whether the label is drawn at source time `t` (half-open window).
    pub fn is_visible_at(&self, t: f64) -> bool {
        if self.text.is_empty() {
            return false;
        }
        let after_start = self.start_secs.map_or(true, |start| t >= start);
        let before_end = self.end_secs.map_or(true, |end| t < end);
        after_start && before_end
    }

    /// Whether the label is visible anywhere inside `[start, end)`.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        let label_start = self.start_secs.unwrap_or(f64::NEG_INFINITY);
        let label_end = self.end_secs.unwrap_or(f64::INFINITY);
        label_start < end && label_end > start
    }

    /// Check the visibility window is well-formed.
    pub fn validate_window(&self) -> Result<(), String> {
        for (name, value) in [("start", self.start_secs), ("end", self.end_secs)] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(format!("label {} {name} time must be >= 0, got {v}", self.id));
                }
            }
        }
        if let (Some(start), Some(end)) = (self.start_secs, self.end_secs) {
            if end <= start {
                return Err(format!(
                    "label {} window is empty: end {end} <= start {start}",
                    self.id
                ));
            }
        }
        Ok(())
    }
}

/// Visual styling for a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    /// Text fill color.
    pub color: Rgba,

    /// Font size in editor-canvas pixels.
    pub font_size: f64,

    /// Optional box drawn behind the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Rgba>,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            color: Rgba::RED,
            font_size: 30.0,
            background: None,
        }
    }
}

/// An 8-bit straight-alpha color.
///
/// Serialized as `#rrggbbaa`. Parses `#rgb`, `#rrggbb`, `#rrggbbaa` and a
/// handful of CSS color names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const RED: Rgba = Rgba::opaque(255, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}: expected #rgb, #rrggbb, #rrggbbaa or a color name")]
pub struct ColorParseError(pub String);

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let named = match raw.to_ascii_lowercase().as_str() {
            "red" => Some(Rgba::RED),
            "white" => Some(Rgba::WHITE),
            "black" => Some(Rgba::BLACK),
            "yellow" => Some(Rgba::opaque(255, 255, 0)),
            "green" => Some(Rgba::opaque(0, 128, 0)),
            "blue" => Some(Rgba::opaque(0, 0, 255)),
            "transparent" => Some(Rgba::new(0, 0, 0, 0)),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let err = || ColorParseError(s.to_string());
        let hex = raw.strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        let nibble = |i: usize| {
            u8::from_str_radix(&hex[i..i + 1], 16)
                .map(|v| v * 17)
                .map_err(|_| err())
        };

        match hex.len() {
            3 => Ok(Rgba::opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Ok(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(err()),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label() -> Label {
        Label::new("l1", "Hello", 100.0, 50.0, CanvasSize::EDITOR_DEFAULT)
    }

    #[test]
    fn test_new_label_is_clamped_to_canvas() {
        let l = Label::new("l1", "edge", 900.0, -4.0, CanvasSize::EDITOR_DEFAULT);
        assert_eq!((l.x, l.y), (640.0, 0.0));
    }

    #[test]
    fn test_unbounded_label_always_visible() {
        let l = label();
        assert!(l.is_visible_at(0.0));
        assert!(l.is_visible_at(3600.0));
    }

    #[test]
    fn test_window_is_half_open() {
        let l = label().with_window(Some(2.0), Some(4.0));
        assert!(!l.is_visible_at(1.999));
        assert!(l.is_visible_at(2.0));
        assert!(l.is_visible_at(3.999));
        assert!(!l.is_visible_at(4.0));
    }

    #[test]
    fn test_empty_text_is_never_visible() {
        let mut l = label();
        l.text.clear();
        assert!(!l.is_visible_at(1.0));
    }

    #[test]
    fn test_overlaps() {
        let l = label().with_window(Some(5.0), None);
        assert!(!l.overlaps(0.0, 5.0));
        assert!(l.overlaps(4.0, 5.1));
        assert!(label().overlaps(100.0, 101.0));
    }

    #[test]
    fn test_validate_window_rejects_inverted_range() {
        assert!(label().with_window(Some(3.0), Some(3.0)).validate_window().is_err());
        assert!(label().with_window(Some(-1.0), None).validate_window().is_err());
        assert!(label().with_window(Some(1.0), Some(2.0)).validate_window().is_ok());
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!("#f00".parse::<Rgba>().unwrap(), Rgba::RED);
        assert_eq!("#00ff00".parse::<Rgba>().unwrap(), Rgba::opaque(0, 255, 0));
        assert_eq!(
            "#00000080".parse::<Rgba>().unwrap(),
            Rgba::new(0, 0, 0, 0x80)
        );
        assert_eq!("Red".parse::<Rgba>().unwrap(), Rgba::RED);
        assert!("#12345".parse::<Rgba>().is_err());
        assert!("ff0000".parse::<Rgba>().is_err());
        assert!("#gg0000".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_label_json_shape() {
        let l = label().with_style(LabelStyle {
            color: Rgba::WHITE,
            font_size: 24.0,
            background: Some(Rgba::new(0, 0, 0, 160)),
        });
        let json = serde_json::to_value(&l).unwrap();
        assert_eq!(json["style"]["color"], "#ffffffff");
        assert_eq!(json["style"]["background"], "#000000a0");
        assert!(json.get("start_secs").is_none());

        let parsed: Label = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, l);
    }

    #[test]
    fn test_label_without_style_uses_editor_defaults() {
        let parsed: Label =
            serde_json::from_str(r#"{"id":"a","text":"hi","x":1.0,"y":2.0}"#).unwrap();
        assert_eq!(parsed.style.color, Rgba::RED);
        assert!((parsed.style.font_size - 30.0).abs() < 1e-9);
    }
}
