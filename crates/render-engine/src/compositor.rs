//! Frame compositor: places labels over decoded frames.
//!
//! Composition is split into a pure planning step, which decides for every
//! output frame which labels are visible and where they land in output
//! pixels, and a drawing step that applies one plan to one decoded frame.

use image::RgbaImage;

use reelmark_common::clock::FrameClock;
use reelmark_project_model::canvas::CanvasSize;
use reelmark_project_model::label::Label;
use reelmark_project_model::trim::TrimRange;

use crate::text::LabelRasterizer;

/// A single frame's composition instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameComposition {
    /// Frame number within the export.
    pub frame_index: u64,

    /// Time in the exported clip, in seconds.
    pub output_time_secs: f64,

    /// Time in the source video, in seconds.
    pub source_time_secs: f64,

    /// Labels drawn on this frame, bottom to top.
    pub labels: Vec<LabelPlacement>,
}

/// A label mapped into output pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacement {
    pub label_id: String,
    pub text: String,
    /// Baseline-left X in output pixels.
    pub x: f32,
    /// Baseline Y in output pixels.
    pub y: f32,
    /// Font size in output pixels.
    pub font_px: f32,
    pub color: [u8; 4],
    pub background: Option<[u8; 4]>,
}

impl LabelPlacement {
    fn from_label(label: &Label, canvas: CanvasSize, output: CanvasSize) -> Self {
        let (x, y) = canvas.map_to(output, label.x, label.y);
        Self {
            label_id: label.id.clone(),
            text: label.text.clone(),
            x: x as f32,
            y: y as f32,
            font_px: (label.style.font_size * canvas.scale_to(output)) as f32,
            color: label.style.color.to_array(),
            background: label.style.background.map(|c| c.to_array()),
        }
    }
}

/// Frames `[first, end)` of the export on which a label is drawn.
///
/// Window edges are converted to frame indices with the same tolerance the
/// clock uses for frame counts, so an edge that lands on a frame boundary
/// selects that frame regardless of float error in `trim.start + i / fps`.
fn visible_frames(label: &Label, trim: &TrimRange, clock: FrameClock, total: u64) -> (u64, u64) {
    let first = label
        .start_secs
        .map_or(0, |start| clock.frame_count(start - trim.start_secs));
    let end = label
        .end_secs
        .map_or(total, |end| clock.frame_count(end - trim.start_secs));
    (first.min(total), end.min(total))
}

/// Compute the composition for each frame in the export.
///
/// One entry per output frame of the trim window, in order. Frame `i`
/// samples the source at `trim.start + i / fps`; a label is drawn on every
/// frame whose sample time falls inside its `[start, end)` window.
pub fn compute_compositions(
    labels: &[Label],
    trim: &TrimRange,
    canvas: CanvasSize,
    output: CanvasSize,
    fps: u32,
) -> Vec<FrameComposition> {
    let clock = FrameClock::new(fps);
    let total_frames = clock.frame_count(trim.duration_secs());
    let mut compositions = Vec::with_capacity(total_frames as usize);

    // Placement only depends on the label, so map each one once.
    let placements: Vec<((u64, u64), LabelPlacement)> = labels
        .iter()
        .filter(|label| !label.text.is_empty())
        .map(|label| {
            (
                visible_frames(label, trim, clock, total_frames),
                LabelPlacement::from_label(label, canvas, output),
            )
        })
        .filter(|((first, end), _)| first < end)
        .collect();

    for frame in 0..total_frames {
        let output_time_secs = clock.frame_time(frame);
        let source_time_secs = trim.start_secs + output_time_secs;

        let labels = placements
            .iter()
            .filter(|((first, end), _)| (*first..*end).contains(&frame))
            .map(|(_, placement)| placement.clone())
            .collect();

        compositions.push(FrameComposition {
            frame_index: frame,
            output_time_secs,
            source_time_secs,
            labels,
        });
    }

    compositions
}

/// Draws composition plans onto frames.
#[derive(Debug)]
pub struct Compositor {
    text: Option<LabelRasterizer>,
}

impl Compositor {
    pub fn new(text: LabelRasterizer) -> Self {
        Self { text: Some(text) }
    }

    /// A compositor that passes frames through untouched, for plans without
    /// any label.
    pub fn passthrough() -> Self {
        Self { text: None }
    }

    /// Draw every placement of `composition` onto `frame`, in order.
    pub fn composite(&self, frame: &mut RgbaImage, composition: &FrameComposition) {
        let Some(text) = &self.text else {
            if !composition.labels.is_empty() {
                tracing::warn!(
                    frame = composition.frame_index,
                    "Compositor has no font; labels skipped"
                );
            }
            return;
        };

        for placement in &composition.labels {
            if let Some(bg) = placement.background {
                text.draw_background(
                    frame,
                    &placement.text,
                    placement.x,
                    placement.y,
                    placement.font_px,
                    bg,
                );
            }
            text.draw(
                frame,
                &placement.text,
                placement.x,
                placement.y,
                placement.font_px,
                placement.color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(id: &str, x: f64, y: f64) -> Label {
        Label::new(id, id, x, y, CanvasSize::EDITOR_DEFAULT)
    }

    #[test]
    fn test_one_composition_per_frame() {
        let trim = TrimRange::new(2.0, 3.0);
        let comps = compute_compositions(
            &[],
            &trim,
            CanvasSize::EDITOR_DEFAULT,
            CanvasSize::new(1280, 720),
            30,
        );
        assert_eq!(comps.len(), 30);
        assert_eq!(comps[0].frame_index, 0);
        assert!((comps[0].source_time_secs - 2.0).abs() < 1e-9);
        assert!((comps[29].output_time_secs - 29.0 / 30.0).abs() < 1e-9);
        assert!(comps.windows(2).all(|w| w[1].frame_index == w[0].frame_index + 1));
    }

    #[test]
    fn test_labels_mapped_to_output_space() {
        let comps = compute_compositions(
            &[label("a", 320.0, 180.0)],
            &TrimRange::new(0.0, 0.1),
            CanvasSize::EDITOR_DEFAULT,
            CanvasSize::new(1920, 1080),
            30,
        );
        let placement = &comps[0].labels[0];
        assert_eq!((placement.x, placement.y), (960.0, 540.0));
        assert_eq!(placement.font_px, 90.0);
        assert_eq!(placement.color, [255, 0, 0, 255]);
    }

    #[test]
    fn test_label_window_uses_source_time() {
        let windowed = label("w", 10.0, 10.0).with_window(Some(5.5), Some(6.0));
        let comps = compute_compositions(
            &[windowed, label("always", 20.0, 20.0)],
            &TrimRange::new(5.0, 6.5),
            CanvasSize::EDITOR_DEFAULT,
            CanvasSize::EDITOR_DEFAULT,
            10,
        );
        assert_eq!(comps.len(), 15);
        let visible: Vec<usize> = comps
            .iter()
            .filter(|c| c.labels.iter().any(|l| l.label_id == "w"))
            .map(|c| c.frame_index as usize)
            .collect();
        assert_eq!(visible, vec![5, 6, 7, 8, 9]);
        assert!(comps.iter().all(|c| c.labels.iter().any(|l| l.label_id == "always")));
    }

    fn visible_frames_of(comps: &[FrameComposition], id: &str) -> Vec<u64> {
        comps
            .iter()
            .filter(|c| c.labels.iter().any(|l| l.label_id == id))
            .map(|c| c.frame_index)
            .collect()
    }

    #[test]
    fn test_window_edge_on_frame_boundary_is_exact() {
        // 0.7 + 1/10 is 0.7999999999999999 in f64
        let windowed = label("w", 10.0, 10.0).with_window(Some(0.8), Some(0.9));
        let comps = compute_compositions(
            &[windowed],
            &TrimRange::new(0.7, 1.0),
            CanvasSize::EDITOR_DEFAULT,
            CanvasSize::EDITOR_DEFAULT,
            10,
        );
        assert_eq!(comps.len(), 3);
        assert_eq!(visible_frames_of(&comps, "w"), vec![1]);
    }

    #[test]
    fn test_window_partially_before_trim_starts_at_first_frame() {
        let windowed = label("w", 10.0, 10.0).with_window(Some(1.0), Some(2.05));
        let comps = compute_compositions(
            &[windowed],
            &TrimRange::new(1.5, 2.5),
            CanvasSize::EDITOR_DEFAULT,
            CanvasSize::EDITOR_DEFAULT,
            10,
        );
        // Samples at 1.5..=2.0 fall inside the window, 2.1 does not.
        assert_eq!(visible_frames_of(&comps, "w"), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_text_never_drawn() {
        let comps = compute_compositions(
            &[label("", 10.0, 10.0)],
            &TrimRange::new(0.0, 0.5),
            CanvasSize::EDITOR_DEFAULT,
            CanvasSize::EDITOR_DEFAULT,
            10,
        );
        assert!(comps.iter().all(|c| c.labels.is_empty()));
    }

    #[test]
    fn test_draw_order_preserved() {
        let comps = compute_compositions(
            &[label("bottom", 1.0, 1.0), label("top", 2.0, 2.0)],
            &TrimRange::new(0.0, 1.0 / 30.0),
            CanvasSize::EDITOR_DEFAULT,
            CanvasSize::EDITOR_DEFAULT,
            30,
        );
        assert_eq!(comps.len(), 1);
        let ids: Vec<&str> = comps[0].labels.iter().map(|l| l.label_id.as_str()).collect();
        assert_eq!(ids, vec!["bottom", "top"]);
    }

    #[test]
    fn test_empty_trim_has_no_frames() {
        let comps = compute_compositions(
            &[label("a", 1.0, 1.0)],
            &TrimRange::new(3.0, 3.0),
            CanvasSize::EDITOR_DEFAULT,
            CanvasSize::EDITOR_DEFAULT,
            30,
        );
        assert!(comps.is_empty());
    }

    #[test]
    fn test_passthrough_leaves_frame_untouched() {
        let comps = compute_compositions(
            &[label("a", 1.0, 20.0)],
            &TrimRange::new(0.0, 0.05),
            CanvasSize::EDITOR_DEFAULT,
            CanvasSize::EDITOR_DEFAULT,
            30,
        );
        let mut frame = RgbaImage::from_pixel(640, 360, image::Rgba([7, 7, 7, 255]));
        Compositor::passthrough().composite(&mut frame, &comps[0]);
        assert!(frame.pixels().all(|p| p.0 == [7, 7, 7, 255]));
    }
}
