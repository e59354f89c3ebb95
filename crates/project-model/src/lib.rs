//! Reelmark Project Model
//!
//! Defines the core data contracts for Reelmark projects:
//! - **Labels:** Text annotations positioned on the editor canvas, with an
//!   optional visibility window on the source timeline
//! - **Trim:** The `[start, end]` window of the source exported as a clip
//! - **Canvas:** The editor coordinate space and its mapping to output frames
//! - **Project:** Top-level metadata, source video, and export configuration
//!
//! Label coordinates are stored in editor-canvas pixels so that a project
//! renders identically at any output resolution.

pub mod canvas;
pub mod label;
pub mod project;
pub mod trim;

pub use canvas::*;
pub use label::*;
pub use project::*;
pub use trim::*;
