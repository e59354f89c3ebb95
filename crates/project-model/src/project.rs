//! Project metadata and configuration types.
//!
//! A project is the top-level container that ties together the source
//! video, the labels drawn over it, the trim selection, and export settings.
//!
//! On disk a project is a bundle directory:
//!
//! ```text
//! my-clip/
//! ├── sources/   (imported source video)
//! ├── meta/      (project.json)
//! ├── cache/     (thumbnails)
//! └── exports/   (rendered output)
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::canvas::CanvasSize;
use crate::label::{Label, LabelStyle};
use crate::trim::{TrimError, TrimRange};

/// Current `project.json` schema version.
pub const PROJECT_VERSION: &str = "1.0";

/// Top-level project file (`project.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Schema version.
    pub version: String,

    /// Human-readable project name (the video title).
    pub name: String,

    /// Unique project identifier (UUID).
    pub id: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,

    /// Imported source video, if any.
    #[serde(default)]
    pub source: Option<SourceVideo>,

    /// Editor canvas the label coordinates refer to.
    #[serde(default)]
    pub canvas: CanvasSize,

    /// Labels in draw order (later labels are drawn on top).
    #[serde(default)]
    pub labels: Vec<Label>,

    /// Selected export window.
    #[serde(default)]
    pub trim: TrimRange,

    /// Export configuration.
    pub export: ExportConfig,
}

/// Reference to the imported source video with probed metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceVideo {
    /// Relative path from project root to the media file.
    pub path: String,

    /// Duration in seconds.
    pub duration_secs: f64,

    /// Decoded frame size.
    pub width: u32,
    pub height: u32,

    /// Native frame rate.
    pub fps: f64,

    /// Whether the container has an audio stream.
    #[serde(default)]
    pub has_audio: bool,

    /// Video codec name as reported by the probe.
    #[serde(default)]
    pub codec: String,
}

impl SourceVideo {
    /// Frame size of the source.
    pub fn size(&self) -> CanvasSize {
        CanvasSize::new(self.width, self.height)
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format.
    pub format: ExportFormat,

    /// Output resolution. Zero means "use the source frame size".
    pub width: u32,
    pub height: u32,

    /// Output frame rate.
    pub fps: u32,

    /// Video bitrate in kbps.
    pub video_bitrate_kbps: u32,

    /// Audio bitrate in kbps.
    pub audio_bitrate_kbps: u32,

    /// Carry the source audio of the trimmed window into the export.
    #[serde(default = "default_keep_audio")]
    pub keep_audio: bool,
}

fn default_keep_audio() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Mp4H264,
            width: 0,
            height: 0,
            fps: 30,
            video_bitrate_kbps: 6000,
            audio_bitrate_kbps: 192,
            keep_audio: true,
        }
    }
}

impl ExportConfig {
    /// Resolve the output frame size against the source size.
    ///
    /// Zero dimensions fall back to the source (or the editor canvas when no
    /// source is known). A single zero dimension is derived from the other
    /// preserving the source aspect. Formats that encode to yuv420p are
    /// rounded down to even dimensions.
    pub fn output_size(&self, source: Option<CanvasSize>) -> CanvasSize {
        let base = source.unwrap_or(CanvasSize::EDITOR_DEFAULT);
        let size = match (self.width, self.height) {
            (0, 0) => base,
            (w, 0) => CanvasSize::new(w, (w as f64 / base.aspect()).round() as u32),
            (0, h) => CanvasSize::new((h as f64 * base.aspect()).round() as u32, h),
            (w, h) => CanvasSize::new(w, h),
        };
        if self.format.requires_even_dimensions() {
            size.to_even()
        } else {
            size
        }
    }
}

/// Output video format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[serde(rename = "mp4-h264")]
    Mp4H264,
    #[serde(rename = "mp4-h265")]
    Mp4H265,
    Webm,
    Gif,
    /// Numbered PNG frames, no transcoding.
    #[serde(rename = "png-sequence")]
    PngSequence,
}

impl ExportFormat {
    /// All formats, in CLI listing order.
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Mp4H264,
        ExportFormat::Mp4H265,
        ExportFormat::Webm,
        ExportFormat::Gif,
        ExportFormat::PngSequence,
    ];

    /// CLI / config identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Mp4H264 => "mp4-h264",
            ExportFormat::Mp4H265 => "mp4-h265",
            ExportFormat::Webm => "webm",
            ExportFormat::Gif => "gif",
            ExportFormat::PngSequence => "png-sequence",
        }
    }

    /// Default output file extension (empty for directory outputs).
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Mp4H264 | ExportFormat::Mp4H265 => "mp4",
            ExportFormat::Webm => "webm",
            ExportFormat::Gif => "gif",
            ExportFormat::PngSequence => "",
        }
    }

    /// Whether the encoder output uses chroma subsampling that needs even sizes.
    pub fn requires_even_dimensions(self) -> bool {
        matches!(
            self,
            ExportFormat::Mp4H264 | ExportFormat::Mp4H265 | ExportFormat::Webm
        )
    }

    /// Whether the format can carry an audio track.
    pub fn supports_audio(self) -> bool {
        matches!(
            self,
            ExportFormat::Mp4H264 | ExportFormat::Mp4H265 | ExportFormat::Webm
        )
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = ExportFormat::ALL.iter().map(|f| f.as_str()).collect();
                format!("Unknown format: {s}. Use: {}", known.join(", "))
            })
    }
}

/// The complete in-memory representation of a loaded project.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    /// Filesystem path to the project directory.
    pub root: PathBuf,

    /// Project metadata.
    pub project: Project,
}

impl Project {
    /// Create a new project with defaults.
    pub fn new(name: impl Into<String>, canvas: CanvasSize) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: PROJECT_VERSION.to_string(),
            name: name.into(),
            id: uuid_v4(),
            created_at: now.clone(),
            modified_at: now,
            source: None,
            canvas,
            labels: vec![],
            trim: TrimRange::default(),
            export: ExportConfig::default(),
        }
    }

    fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }

    /// Source duration, or `None` when no video is imported yet.
    pub fn source_duration(&self) -> Option<f64> {
        self.source.as_ref().map(|s| s.duration_secs)
    }

    /// Look up a label by id.
    pub fn label(&self, id: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.id == id)
    }

    fn label_mut(&mut self, id: &str) -> Result<&mut Label, ProjectError> {
        self.labels
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| ProjectError::LabelNotFound { id: id.to_string() })
    }

    /// Add a label at a canvas position and return its id.
    ///
    /// The position is clamped to the canvas, as a drop outside the canvas
    /// lands on its nearest edge.
    pub fn add_label(
        &mut self,
        text: impl Into<String>,
        x: f64,
        y: f64,
        style: LabelStyle,
        window: (Option<f64>, Option<f64>),
    ) -> Result<String, ProjectError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ProjectError::ValidationError {
                message: "label text must not be empty".to_string(),
            });
        }
        if !(style.font_size.is_finite() && style.font_size > 0.0) {
            return Err(ProjectError::ValidationError {
                message: format!("label font size must be > 0, got {}", style.font_size),
            });
        }

        let id = self.next_label_id();
        let label = Label::new(id.clone(), text, x, y, self.canvas)
            .with_style(style)
            .with_window(window.0, window.1);
        label
            .validate_window()
            .map_err(|message| ProjectError::ValidationError { message })?;

        self.labels.push(label);
        self.touch();
        Ok(id)
    }

    /// Move a label to a new canvas position (clamped to the canvas).
    pub fn move_label(&mut self, id: &str, x: f64, y: f64) -> Result<(), ProjectError> {
        let canvas = self.canvas;
        self.label_mut(id)?.move_to(x, y, canvas);
        self.touch();
        Ok(())
    }

    /// Replace a label's text.
    pub fn update_label_text(
        &mut self,
        id: &str,
        text: impl Into<String>,
    ) -> Result<(), ProjectError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ProjectError::ValidationError {
                message: "label text must not be empty".to_string(),
            });
        }
        self.label_mut(id)?.text = text;
        self.touch();
        Ok(())
    }

    /// Replace a label's style.
    pub fn set_label_style(&mut self, id: &str, style: LabelStyle) -> Result<(), ProjectError> {
        self.label_mut(id)?.style = style;
        self.touch();
        Ok(())
    }

    /// Set or clear a label's visibility window.
    pub fn set_label_window(
        &mut self,
        id: &str,
        start_secs: Option<f64>,
        end_secs: Option<f64>,
    ) -> Result<(), ProjectError> {
        let label = self.label_mut(id)?;
        let candidate = label.clone().with_window(start_secs, end_secs);
        candidate
            .validate_window()
            .map_err(|message| ProjectError::ValidationError { message })?;
        *label = candidate;
        self.touch();
        Ok(())
    }

    /// Remove a label, returning it.
    pub fn remove_label(&mut self, id: &str) -> Result<Label, ProjectError> {
        let idx = self
            .labels
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| ProjectError::LabelNotFound { id: id.to_string() })?;
        let removed = self.labels.remove(idx);
        self.touch();
        Ok(removed)
    }

    /// Set the trim range, validated against the source duration.
    pub fn set_trim(&mut self, range: TrimRange) -> Result<(), ProjectError> {
        let duration = self.source_duration().ok_or_else(|| ProjectError::ValidationError {
            message: "cannot trim a project without a source video".to_string(),
        })?;
        range.validate(duration)?;
        self.trim = range;
        self.touch();
        Ok(())
    }

    /// Millisecond-timestamp id, unique within this project.
    fn next_label_id(&self) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let base = millis.to_string();
        if self.label(&base).is_none() {
            return base;
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{base}-{n}");
            if self.label(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }
}

impl LoadedProject {
    /// Path of `meta/project.json` under `root`.
    pub fn project_file(root: &Path) -> PathBuf {
        root.join("meta").join("project.json")
    }

    /// Load a project from a directory.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();
        let project_path = Self::project_file(&root);

        let project_json =
            std::fs::read_to_string(&project_path).map_err(|e| ProjectError::IoError {
                path: project_path.clone(),
                source: e,
            })?;

        let project: Project =
            serde_json::from_str(&project_json).map_err(|e| ProjectError::ParseError {
                path: project_path,
                source: e,
            })?;

        Ok(Self { root, project })
    }

    /// Save the project file to disk.
    pub fn save(&self) -> Result<(), ProjectError> {
        let meta_dir = self.root.join("meta");
        std::fs::create_dir_all(&meta_dir).map_err(|e| ProjectError::IoError {
            path: meta_dir.clone(),
            source: e,
        })?;

        let project_path = meta_dir.join("project.json");
        let project_json =
            serde_json::to_string_pretty(&self.project).map_err(|e| ProjectError::ParseError {
                path: project_path.clone(),
                source: e,
            })?;
        std::fs::write(&project_path, project_json).map_err(|e| ProjectError::IoError {
            path: project_path,
            source: e,
        })?;

        Ok(())
    }

    /// Create a new project on disk with the standard directory structure.
    pub fn create(
        root: impl AsRef<Path>,
        name: impl Into<String>,
        canvas: CanvasSize,
    ) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();

        for subdir in &["sources", "meta", "cache", "exports"] {
            std::fs::create_dir_all(root.join(subdir)).map_err(|e| ProjectError::IoError {
                path: root.join(subdir),
                source: e,
            })?;
        }

        let loaded = Self {
            root,
            project: Project::new(name, canvas),
        };
        loaded.save()?;
        Ok(loaded)
    }

    /// Copy a video into `sources/` and record its metadata.
    ///
    /// `info.path` is replaced with the bundle-relative location. The trim
    /// range is reset to the default selection for the new duration.
    pub fn import_source(
        &mut self,
        video: impl AsRef<Path>,
        mut info: SourceVideo,
    ) -> Result<(), ProjectError> {
        let video = video.as_ref();
        let file_name = video
            .file_name()
            .ok_or_else(|| ProjectError::ValidationError {
                message: format!("not a file path: {}", video.display()),
            })?;

        let relative = Path::new("sources").join(file_name);
        let dest = self.root.join(&relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ProjectError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let same_file = match (video.canonicalize(), dest.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if !same_file {
            std::fs::copy(video, &dest).map_err(|e| ProjectError::IoError {
                path: video.to_path_buf(),
                source: e,
            })?;
        }

        info.path = relative.to_string_lossy().replace('\\', "/");
        self.project.trim = TrimRange::default_for(info.duration_secs);
        self.project.source = Some(info);
        self.project.touch();
        Ok(())
    }

    /// Absolute path of the source video, if one is imported.
    pub fn source_path(&self) -> Option<PathBuf> {
        self.project
            .source
            .as_ref()
            .map(|source| self.root.join(&source.path))
    }

    /// Validate that the project is ready to export.
    pub fn validate_sources(&self) -> Vec<String> {
        let mut errors = vec![];

        match &self.project.source {
            None => errors.push("No source video imported".to_string()),
            Some(source) => {
                if !self.root.join(&source.path).exists() {
                    errors.push(format!("Source video missing: {}", source.path));
                }
                if let Err(e) = self.project.trim.validate(source.duration_secs) {
                    errors.push(format!("Trim range invalid: {e}"));
                }
            }
        }

        for label in &self.project.labels {
            if !self.project.canvas.contains(label.x, label.y) {
                errors.push(format!(
                    "Label {} lies outside the {} canvas",
                    label.id, self.project.canvas
                ));
            }
            if let Err(e) = label.validate_window() {
                errors.push(format!("Label window invalid: {e}"));
            }
        }

        errors
    }
}

/// Errors that can occur when working with projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Label not found: {id}")]
    LabelNotFound { id: String },

    #[error("Invalid trim range: {0}")]
    Trim(#[from] TrimError),

    #[error("Invalid project: {message}")]
    ValidationError { message: String },
}

/// Generate a simple UUID v4 without external dependency.
fn uuid_v4() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        (seed & 0xFFFFFFFF) as u32,
        ((seed >> 32) & 0xFFFF) as u16,
        ((seed >> 48) & 0x0FFF) as u16,
        (((seed >> 60) & 0x3F) | 0x80) as u16 | (((seed >> 66) & 0x3FF) as u16) << 6,
        (seed >> 76) & 0xFFFFFFFFFFFF,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Rgba;

    fn source(duration_secs: f64) -> SourceVideo {
        SourceVideo {
            path: "sources/clip.mp4".to_string(),
            duration_secs,
            width: 1280,
            height: 720,
            fps: 30.0,
            has_audio: true,
            codec: "h264".to_string(),
        }
    }

    #[test]
    fn test_project_creation() {
        let project = Project::new("Test Clip", CanvasSize::EDITOR_DEFAULT);
        assert_eq!(project.name, "Test Clip");
        assert_eq!(project.canvas, CanvasSize::new(640, 360));
        assert_eq!(project.export.fps, 30);
        assert!(project.labels.is_empty());
    }

    #[test]
    fn test_project_serialization() {
        let mut project = Project::new("Test", CanvasSize::EDITOR_DEFAULT);
        project
            .add_label("Hi", 10.0, 20.0, LabelStyle::default(), (None, None))
            .unwrap();
        let json = serde_json::to_string_pretty(&project).unwrap();
        let parsed: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, "Test");
        assert_eq!(parsed.version, "1.0");
        assert_eq!(parsed.labels, project.labels);
    }

    #[test]
    fn test_add_label_clamps_and_generates_unique_ids() {
        let mut project = Project::new("Test", CanvasSize::EDITOR_DEFAULT);
        let a = project
            .add_label("A", 700.0, 400.0, LabelStyle::default(), (None, None))
            .unwrap();
        let b = project
            .add_label("B", 5.0, 5.0, LabelStyle::default(), (None, None))
            .unwrap();
        assert_ne!(a, b);
        let label = project.label(&a).unwrap();
        assert_eq!((label.x, label.y), (640.0, 360.0));
    }

    #[test]
    fn test_add_label_rejects_empty_text_and_bad_window() {
        let mut project = Project::new("Test", CanvasSize::EDITOR_DEFAULT);
        assert!(project
            .add_label("  ", 1.0, 1.0, LabelStyle::default(), (None, None))
            .is_err());
        assert!(project
            .add_label("x", 1.0, 1.0, LabelStyle::default(), (Some(4.0), Some(2.0)))
            .is_err());
        assert!(project.labels.is_empty());
    }

    #[test]
    fn test_label_edit_operations() {
        let mut project = Project::new("Test", CanvasSize::EDITOR_DEFAULT);
        let id = project
            .add_label("A", 1.0, 1.0, LabelStyle::default(), (None, None))
            .unwrap();

        project.move_label(&id, 50.0, 60.0).unwrap();
        project.update_label_text(&id, "B").unwrap();
        project.set_label_window(&id, Some(1.0), Some(2.0)).unwrap();
        project
            .set_label_style(
                &id,
                LabelStyle {
                    color: Rgba::WHITE,
                    ..LabelStyle::default()
                },
            )
            .unwrap();

        let label = project.label(&id).unwrap();
        assert_eq!((label.x, label.y), (50.0, 60.0));
        assert_eq!(label.text, "B");
        assert_eq!(label.start_secs, Some(1.0));
        assert_eq!(label.style.color, Rgba::WHITE);

        assert!(project.set_label_window(&id, Some(3.0), Some(1.0)).is_err());
        assert_eq!(project.label(&id).unwrap().start_secs, Some(1.0));

        let removed = project.remove_label(&id).unwrap();
        assert_eq!(removed.text, "B");
        assert!(matches!(
            project.remove_label(&id),
            Err(ProjectError::LabelNotFound { .. })
        ));
    }

    #[test]
    fn test_set_trim_requires_source_and_validates() {
        let mut project = Project::new("Test", CanvasSize::EDITOR_DEFAULT);
        assert!(project.set_trim(TrimRange::new(0.0, 1.0)).is_err());

        project.source = Some(source(5.0));
        assert!(project.set_trim(TrimRange::new(1.0, 4.0)).is_ok());
        assert!(matches!(
            project.set_trim(TrimRange::new(1.0, 6.0)),
            Err(ProjectError::Trim(TrimError::PastEnd { .. }))
        ));
        assert_eq!(project.trim, TrimRange::new(1.0, 4.0));
    }

    #[test]
    fn test_output_size_resolution() {
        let source_size = Some(CanvasSize::new(1280, 720));
        let mut export = ExportConfig::default();
        assert_eq!(export.output_size(source_size), CanvasSize::new(1280, 720));

        export.width = 640;
        assert_eq!(export.output_size(source_size), CanvasSize::new(640, 360));

        export.width = 0;
        export.height = 241;
        assert_eq!(export.output_size(source_size), CanvasSize::new(428, 240));

        export.format = ExportFormat::PngSequence;
        export.width = 641;
        export.height = 361;
        assert_eq!(export.output_size(source_size), CanvasSize::new(641, 361));
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("webm".parse::<ExportFormat>(), Ok(ExportFormat::Webm));
        assert_eq!(
            "png-sequence".parse::<ExportFormat>(),
            Ok(ExportFormat::PngSequence)
        );
        assert!("avi".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_loaded_project_create_and_load() {
        let dir = std::env::temp_dir().join("reelmark_test_project");
        let _ = std::fs::remove_dir_all(&dir);

        let created =
            LoadedProject::create(&dir, "Integration Test", CanvasSize::EDITOR_DEFAULT).unwrap();
        assert_eq!(created.project.name, "Integration Test");
        assert!(dir.join("sources").is_dir());
        assert!(dir.join("exports").is_dir());

        let loaded = LoadedProject::load(&dir).unwrap();
        assert_eq!(loaded.project.name, "Integration Test");
        assert_eq!(loaded.project.id, created.project.id);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_import_source_copies_file_and_resets_trim() {
        let dir = std::env::temp_dir().join("reelmark_test_import");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let video = dir.join("input.mp4");
        std::fs::write(&video, b"not really a video").unwrap();

        let mut loaded =
            LoadedProject::create(dir.join("bundle"), "Import", CanvasSize::EDITOR_DEFAULT)
                .unwrap();
        let mut info = source(4.0);
        info.path = String::new();
        loaded.import_source(&video, info).unwrap();

        let source = loaded.project.source.as_ref().unwrap();
        assert_eq!(source.path, "sources/input.mp4");
        assert!(loaded.source_path().unwrap().exists());
        assert_eq!(loaded.project.trim, TrimRange::new(0.0, 4.0));
        assert!(loaded.validate_sources().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_validate_sources_reports_missing() {
        let dir = std::env::temp_dir().join("reelmark_test_validate");
        let _ = std::fs::remove_dir_all(&dir);

        let mut loaded =
            LoadedProject::create(&dir, "Validate Test", CanvasSize::EDITOR_DEFAULT).unwrap();
        let errors = loaded.validate_sources();
        assert!(errors.iter().any(|e| e.contains("No source video")));

        loaded.project.source = Some(source(60.0));
        let errors = loaded.validate_sources();
        assert!(errors.iter().any(|e| e.contains("Source video missing")));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_legacy_project_without_labels_parses() {
        let mut value =
            serde_json::to_value(Project::new("Legacy", CanvasSize::EDITOR_DEFAULT)).unwrap();
        let object = value.as_object_mut().expect("project should be object");
        for key in ["labels", "canvas", "trim", "source"] {
            object.remove(key);
        }

        let parsed: Project = serde_json::from_value(value).unwrap();
        assert!(parsed.labels.is_empty());
        assert_eq!(parsed.canvas, CanvasSize::EDITOR_DEFAULT);
        assert_eq!(parsed.trim, TrimRange::default());
    }
}
