//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ReelmarkError, ReelmarkResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where new projects are created when no output is given.
    pub projects_dir: PathBuf,

    /// Default export settings for new projects.
    pub export: ExportDefaults,

    /// Default label styling.
    pub labels: LabelDefaults,

    /// Editor canvas that label coordinates are authored against.
    pub canvas: CanvasDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Output frame rate.
    pub fps: u32,

    /// Output format identifier (for example `mp4-h264`).
    pub format: String,

    /// Video bitrate in kbps.
    pub video_bitrate_kbps: u32,

    /// Audio bitrate in kbps.
    pub audio_bitrate_kbps: u32,

    /// Whether to carry the source audio into exports.
    pub keep_audio: bool,
}

/// Default label styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelDefaults {
    /// TrueType/OpenType font used to rasterize labels.
    /// When unset, common system font locations are searched.
    pub font_path: Option<PathBuf>,

    /// Font size in editor-canvas pixels.
    pub font_size: f64,

    /// Text color as a hex string.
    pub color: String,
}

/// Editor canvas dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasDefaults {
    pub width: u32,
    pub height: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "reelmark=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            projects_dir: dirs_default_projects(),
            export: ExportDefaults::default(),
            labels: LabelDefaults::default(),
            canvas: CanvasDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            fps: 30,
            format: "mp4-h264".to_string(),
            video_bitrate_kbps: 6000,
            audio_bitrate_kbps: 192,
            keep_audio: true,
        }
    }
}

impl Default for LabelDefaults {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size: 30.0,
            color: "#ff0000".to_string(),
        }
    }
}

impl Default for CanvasDefaults {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        Self::read_from(config_path).unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            Self::default()
        })
    }

    /// Load config from the standard location, returning the load error
    /// alongside the defaults instead of logging it.
    ///
    /// Used before a tracing subscriber exists, so the caller can report the
    /// error once logging is set up.
    pub fn load_deferred() -> (Self, Option<ReelmarkError>) {
        match Self::read_from(&config_file_path()) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Read config from `config_path`. A missing file yields the defaults.
    pub fn read_from(config_path: &std::path::Path) -> ReelmarkResult<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            ReelmarkError::config(format!(
                "Failed to read config at {}: {e}",
                config_path.display()
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ReelmarkError::config(format!(
                "Failed to parse config at {}: {e}",
                config_path.display()
            ))
        })
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("reelmark").join("config.json")
}

/// Default projects directory.
fn dirs_default_projects() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("reelmark").join("projects")
}
