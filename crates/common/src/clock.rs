//! Frame timing for export windows.
//!
//! An export walks a trimmed window of the source video at a fixed output
//! frame rate. Frame `i` of a window starting at `start` samples the source
//! at `start + i / fps`. The frame count follows the editor loop
//! `for (t = 0; t < duration; t += 1 / fps)`: every sample strictly before
//! the window end is rendered.

/// Tolerance used when a window duration is an exact multiple of the frame
/// interval, so that float error does not add a trailing frame.
const FRAME_EPSILON: f64 = 1e-9;

/// Fixed-rate frame clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    fps: u32,
}

impl FrameClock {
    /// Create a clock for the given rate. A rate of zero is treated as 1 fps.
    pub fn new(fps: u32) -> Self {
        Self { fps: fps.max(1) }
    }

    /// Frames per second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(&self) -> f64 {
        1.0 / self.fps as f64
    }

    /// Number of frames sampled from a window of `duration_secs`.
    pub fn frame_count(&self, duration_secs: f64) -> u64 {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return 0;
        }
        (duration_secs * self.fps as f64 - FRAME_EPSILON).ceil().max(0.0) as u64
    }

    /// Time of frame `index` relative to the window start.
    pub fn frame_time(&self, index: u64) -> f64 {
        index as f64 / self.fps as f64
    }

    /// Index of the frame displayed at `time_secs` (relative to window start).
    pub fn frame_at(&self, time_secs: f64) -> u64 {
        if time_secs <= 0.0 {
            return 0;
        }
        (time_secs * self.fps as f64 + FRAME_EPSILON).floor() as u64
    }

    /// Convert an elapsed nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }

    /// Convert seconds to nanoseconds.
    pub fn secs_to_ns(secs: f64) -> u64 {
        (secs * 1_000_000_000.0) as u64
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_exact_multiple_has_no_extra_frame() {
        let clock = FrameClock::new(30);
        assert_eq!(clock.frame_count(1.0), 30);
        assert_eq!(clock.frame_count(10.0), 300);
        // 0.1 * 30 is 3.0000000000000004 in f64
        assert_eq!(clock.frame_count(0.1), 3);
    }

    #[test]
    fn test_frame_count_partial_frame_rounds_up() {
        let clock = FrameClock::new(30);
        assert_eq!(clock.frame_count(1.01), 31);
        assert_eq!(clock.frame_count(0.001), 1);
    }

    #[test]
    fn test_frame_count_empty_window() {
        let clock = FrameClock::new(30);
        assert_eq!(clock.frame_count(0.0), 0);
        assert_eq!(clock.frame_count(-2.0), 0);
        assert_eq!(clock.frame_count(f64::NAN), 0);
    }

    #[test]
    fn test_zero_fps_treated_as_one() {
        let clock = FrameClock::new(0);
        assert_eq!(clock.fps(), 1);
        assert_eq!(clock.frame_count(2.5), 3);
    }

    #[test]
    fn test_frame_time_and_frame_at_agree() {
        let clock = FrameClock::new(24);
        for index in [0u64, 1, 23, 24, 1000] {
            assert_eq!(clock.frame_at(clock.frame_time(index)), index);
        }
        assert_eq!(clock.frame_at(-1.0), 0);
    }

    #[test]
    fn test_ns_to_secs_conversion() {
        assert!((FrameClock::ns_to_secs(1_500_000_000) - 1.5).abs() < 1e-9);
        assert_eq!(FrameClock::secs_to_ns(2.0), 2_000_000_000);
    }
}
