//! Trim range: the window of the source video selected for export.

use serde::{Deserialize, Serialize};

/// Default length of a fresh trim selection, in seconds.
pub const DEFAULT_TRIM_SECS: f64 = 10.0;

/// Slack allowed when comparing the trim end to the probed source duration.
/// Container durations are often rounded to the millisecond.
const DURATION_TOLERANCE_SECS: f64 = 0.001;

/// A `[start, end]` window of the source timeline, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    pub start_secs: f64,
    pub end_secs: f64,
}

/// Reasons a trim range is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrimError {
    #[error("trim start must be >= 0, got {0}")]
    NegativeStart(f64),

    #[error("trim range is empty: end {end} <= start {start}")]
    Empty { start: f64, end: f64 },

    #[error("trim end {end} exceeds source duration {duration}")]
    PastEnd { end: f64, duration: f64 },

    #[error("trim bounds must be finite")]
    NotFinite,
}

impl TrimRange {
    pub fn new(start_secs: f64, end_secs: f64) -> Self {
        Self {
            start_secs,
            end_secs,
        }
    }

    /// The selection a freshly imported video starts with: the first ten
    /// seconds, or the whole video when it is shorter.
    pub fn default_for(duration_secs: f64) -> Self {
        Self::new(0.0, DEFAULT_TRIM_SECS.min(duration_secs.max(0.0)))
    }

    /// Length of the window.
    pub fn duration_secs(&self) -> f64 {
        (self.end_secs - self.start_secs).max(0.0)
    }

    /// Whether source time `t` falls inside the window (end exclusive).
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_secs && t < self.end_secs
    }

    /// Clamp both ends into `[0, duration]`, swapping an inverted range.
    pub fn clamped(&self, duration_secs: f64) -> Self {
        let duration = duration_secs.max(0.0);
        let sanitize = |v: f64| if v.is_finite() { v.clamp(0.0, duration) } else { 0.0 };
        let a = sanitize(self.start_secs);
        let b = sanitize(self.end_secs);
        Self::new(a.min(b), a.max(b))
    }

    /// Validate against a source duration.
    pub fn validate(&self, duration_secs: f64) -> Result<(), TrimError> {
        if !self.start_secs.is_finite() || !self.end_secs.is_finite() {
            return Err(TrimError::NotFinite);
        }
        if self.start_secs < 0.0 {
            return Err(TrimError::NegativeStart(self.start_secs));
        }
        if self.end_secs <= self.start_secs {
            return Err(TrimError::Empty {
                start: self.start_secs,
                end: self.end_secs,
            });
        }
        if self.end_secs > duration_secs + DURATION_TOLERANCE_SECS {
            return Err(TrimError::PastEnd {
                end: self.end_secs,
                duration: duration_secs,
            });
        }
        Ok(())
    }
}

impl Default for TrimRange {
    fn default() -> Self {
        Self::new(0.0, DEFAULT_TRIM_SECS)
    }
}
