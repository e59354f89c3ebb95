//! Reelmark Common Utilities
//!
//! Shared infrastructure for all Reelmark crates:
//! - Error types and result aliases
//! - Frame timing for trimmed export windows
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
