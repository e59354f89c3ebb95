//! Error types shared across Reelmark crates.

use std::path::PathBuf;

/// Top-level error type for Reelmark operations.
#[derive(Debug, thiserror::Error)]
pub enum ReelmarkError {
    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Project error: {message}")]
    Project { message: String },

    #[error("Font error: {message}")]
    Font { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ReelmarkError.
pub type ReelmarkResult<T> = Result<T, ReelmarkError>;

impl ReelmarkError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn project(msg: impl Into<String>) -> Self {
        Self::Project {
            message: msg.into(),
        }
    }

    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors_format_messages() {
        let err = ReelmarkError::render("frame size mismatch");
        assert_eq!(err.to_string(), "Render error: frame size mismatch");

        let err = ReelmarkError::FileNotFound {
            path: PathBuf::from("sources/clip.mp4"),
        };
        assert_eq!(err.to_string(), "File not found: sources/clip.mp4");
    }

    #[test]
    fn test_io_error_converts_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: ReelmarkError = io.into();
        assert!(matches!(err, ReelmarkError::Io(_)));
        assert_eq!(err.to_string(), "pipe closed");
    }
}
