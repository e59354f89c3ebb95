//! Reelmark Render Engine
//!
//! Offline rendering pipeline that burns project labels into the trimmed
//! window of the source video and re-encodes the result.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source.mp4 ── ffmpeg decode (seek, fps, scale) ── raw RGBA frames
//!                                                         │
//! labels + trim ── compute_compositions ──────────────────┤
//!                                                         ├── Compositor (text overlay)
//!                                                         ▼
//!                                                  FrameSink
//!                                                   │      │
//!                            ffmpeg encode (+ source audio)  PNG sequence
//!                                                   │
//!                                                   ▼
//!                                              output.mp4
//! ```
//!
//! Frames are processed one at a time; only a single decoded frame is held
//! in memory at once.

pub mod compositor;
pub mod export;
pub mod probe;
pub mod sink;
pub mod source;
pub mod text;

pub use compositor::{compute_compositions, Compositor, FrameComposition, LabelPlacement};
pub use export::*;
pub use probe::{probe_video, VideoInfo};
pub use sink::{FrameSink, SinkConfig};
pub use source::{FrameSource, VecFrameSource};
pub use text::LabelRasterizer;
