//! Export configuration and job management.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::RgbaImage;

use reelmark_common::config::LabelDefaults;
use reelmark_common::error::{ReelmarkError, ReelmarkResult};
use reelmark_project_model::canvas::CanvasSize;
use reelmark_project_model::project::{ExportConfig, ExportFormat, LoadedProject, SourceVideo};
use reelmark_project_model::trim::TrimRange;

use crate::compositor::{compute_compositions, Compositor, FrameComposition};
use crate::probe::command_exists;
use crate::sink::{
    codec_args_for_format, ensure_parent_dir, AudioInput, FfmpegFrameSink, FfmpegSinkOpts,
    FrameSink, ImageSequenceSink, SinkConfig,
};
use crate::source::{extract_frame, DecodeRequest, FfmpegFrameSource, FrameSource};
use crate::text::LabelRasterizer;

/// Source time of the preview thumbnail.
pub const THUMBNAIL_TIME_SECS: f64 = 0.5;

/// An export job ready to be rendered.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Project root directory.
    pub project_dir: PathBuf,

    /// Output file path (a directory for `png-sequence`).
    pub output_path: PathBuf,

    /// Export configuration.
    pub config: ExportConfig,

    /// Window to export instead of the project's saved trim range.
    pub trim_override: Option<TrimRange>,

    /// Font used for labels. `None` searches the system fonts.
    pub font_path: Option<PathBuf>,
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames rendered so far.
    pub frames_rendered: u64,

    /// Total frames to render.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

impl ExportProgress {
    fn stage(stage: ExportStage, frames_rendered: u64, total_frames: u64) -> Self {
        Self {
            progress: if total_frames == 0 {
                0.0
            } else {
                (frames_rendered as f64 / total_frames as f64).clamp(0.0, 1.0)
            },
            frames_rendered,
            total_frames,
            eta_secs: 0.0,
            stage,
        }
    }
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Rendering,
    Encoding,
    Finalizing,
    Complete,
    Failed,
}

/// Counters collected while running the frame loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub total_frames: u64,
    pub frames_rendered: u64,
    pub frames_with_labels: u64,
    pub labels_drawn: u64,
    pub elapsed_secs: f64,
}

impl PipelineStats {
    /// Whether the source ran out before the planned frame count.
    pub fn is_short(&self) -> bool {
        self.frames_rendered < self.total_frames
    }
}

/// Trait for render backends.
pub trait RenderBackend: Send {
    /// Execute the export job.
    fn render(
        &mut self,
        job: &ExportJob,
        progress: Option<ProgressCallback>,
    ) -> ReelmarkResult<PipelineStats>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Export the project to a video file.
///
/// This is the main entry point for rendering. The frame loop runs on a
/// blocking worker thread.
pub async fn export_project(
    job: ExportJob,
    progress: Option<ProgressCallback>,
) -> ReelmarkResult<PathBuf> {
    tracing::info!(
        output = %job.output_path.display(),
        format = job.config.format.as_str(),
        "Starting export"
    );

    if !job.project_dir.exists() {
        return Err(ReelmarkError::render("Project directory does not exist"));
    }

    if let Some(cb) = &progress {
        cb(ExportProgress::stage(ExportStage::Preparing, 0, 0));
    }

    let mut backend: Box<dyn RenderBackend> = Box::new(FfmpegBackend::new());
    if !backend.is_available() {
        return Err(ReelmarkError::unsupported(
            "No supported render backend found (expected ffmpeg in PATH)",
        ));
    }
    tracing::info!(backend = backend.name(), "Using render backend");

    let output_path = job.output_path.clone();
    tokio::task::spawn_blocking(move || backend.render(&job, progress))
        .await
        .map_err(|e| ReelmarkError::render(format!("Export worker failed: {e}")))??;

    Ok(output_path)
}

/// Re-encode the trim window of the source without drawing labels.
pub async fn trim_only(job: ExportJob) -> ReelmarkResult<PathBuf> {
    if !command_exists("ffmpeg") {
        return Err(ReelmarkError::unsupported("ffmpeg is required but was not found in PATH"));
    }
    tokio::task::spawn_blocking(move || run_trim_only(&job))
        .await
        .map_err(|e| ReelmarkError::render(format!("Trim worker failed: {e}")))?
}

/// Default output location inside the project bundle's `exports/` directory.
pub fn default_output_path(project: &LoadedProject, format: ExportFormat) -> PathBuf {
    let stem: String = project
        .project
        .name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "export".to_string() } else { stem };
    let path = project.root.join("exports").join(stem);
    match format.extension() {
        "" => path,
        ext => path.with_extension(ext),
    }
}

/// Path of the JSON report written next to an export.
pub fn report_path(output_path: &Path) -> PathBuf {
    output_path.with_extension("report.json")
}

/// Drive frames from `source` through `compositor` into `sink`.
///
/// Renders at most one frame per composition. A source that runs dry early
/// is tolerated (decoders commonly drop the tail frame); a source that
/// yields nothing is an error.
pub fn run_pipeline(
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    compositor: &Compositor,
    compositions: &[FrameComposition],
    cfg: SinkConfig,
    progress: Option<&ProgressCallback>,
) -> ReelmarkResult<PipelineStats> {
    let total_frames = compositions.len() as u64;
    if total_frames == 0 {
        return Err(ReelmarkError::render(
            "Nothing to render: the trim window contains no frames",
        ));
    }

    let started = std::time::Instant::now();
    let mut stats = PipelineStats {
        total_frames,
        ..PipelineStats::default()
    };

    sink.begin(cfg)?;

    for composition in compositions {
        let Some(mut frame) = source.next_frame()? else {
            tracing::warn!(
                rendered = stats.frames_rendered,
                expected = total_frames,
                "Decoder ended before the trim window was complete"
            );
            break;
        };

        if frame.dimensions() != (cfg.size.width, cfg.size.height) {
            return Err(ReelmarkError::decode(format!(
                "Decoded frame {} is {}x{}, expected {}",
                composition.frame_index,
                frame.width(),
                frame.height(),
                cfg.size
            )));
        }

        compositor.composite(&mut frame, composition);
        sink.push_frame(composition.frame_index, &frame)?;

        stats.frames_rendered += 1;
        if !composition.labels.is_empty() {
            stats.frames_with_labels += 1;
            stats.labels_drawn += composition.labels.len() as u64;
        }

        if let Some(cb) = progress {
            cb(progress_report(
                stats.frames_rendered,
                total_frames,
                started.elapsed().as_secs_f64(),
            ));
        }
    }

    source.finish()?;

    if stats.frames_rendered == 0 {
        return Err(ReelmarkError::decode("Decoder produced no frames"));
    }

    if let Some(cb) = progress {
        cb(ExportProgress::stage(
            ExportStage::Encoding,
            stats.frames_rendered,
            total_frames,
        ));
    }
    sink.end()?;

    stats.elapsed_secs = started.elapsed().as_secs_f64();
    tracing::debug!(
        frames = stats.frames_rendered,
        labels_drawn = stats.labels_drawn,
        elapsed_secs = stats.elapsed_secs,
        "Frame loop finished"
    );
    Ok(stats)
}

fn progress_report(frames_rendered: u64, total_frames: u64, elapsed_secs: f64) -> ExportProgress {
    let progress = if total_frames == 0 {
        0.0
    } else {
        (frames_rendered as f64 / total_frames as f64).clamp(0.0, 1.0)
    };
    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    ExportProgress {
        progress,
        frames_rendered,
        total_frames,
        eta_secs,
        stage: ExportStage::Rendering,
    }
}

#[derive(Debug, Clone)]
struct ExportInputs {
    project: LoadedProject,
    source: SourceVideo,
    source_path: PathBuf,
    trim: TrimRange,
}

#[derive(Debug, Clone)]
struct ExportPlan {
    output_size: CanvasSize,
    fps: u32,
    compositions: Vec<FrameComposition>,
}

/// Backend that decodes and encodes with the system `ffmpeg`.
#[derive(Debug, Default)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    pub fn new() -> Self {
        Self
    }

    fn load_inputs(&self, job: &ExportJob) -> ReelmarkResult<ExportInputs> {
        load_inputs(job)
    }

    fn build_plan(&self, job: &ExportJob, inputs: &ExportInputs) -> ExportPlan {
        let output_size = job.config.output_size(Some(inputs.source.size()));
        let fps = job.config.fps.max(1);
        let compositions = compute_compositions(
            &inputs.project.project.labels,
            &inputs.trim,
            inputs.project.project.canvas,
            output_size,
            fps,
        );
        ExportPlan {
            output_size,
            fps,
            compositions,
        }
    }

    fn build_compositor(&self, job: &ExportJob, plan: &ExportPlan) -> ReelmarkResult<Compositor> {
        if plan.compositions.iter().all(|c| c.labels.is_empty()) {
            return Ok(Compositor::passthrough());
        }
        let defaults = LabelDefaults {
            font_path: job.font_path.clone(),
            ..LabelDefaults::default()
        };
        let text = LabelRasterizer::discover(&defaults)?;
        tracing::info!(font = %text.source().display(), "Loaded label font");
        Ok(Compositor::new(text))
    }

    fn build_sink(&self, job: &ExportJob, inputs: &ExportInputs) -> Box<dyn FrameSink> {
        if job.config.format == ExportFormat::PngSequence {
            return Box::new(ImageSequenceSink::new(&job.output_path));
        }

        let mut opts = FfmpegSinkOpts::new(&job.output_path, job.config.format);
        opts.video_bitrate_kbps = job.config.video_bitrate_kbps;
        opts.audio_bitrate_kbps = job.config.audio_bitrate_kbps;
        if job.config.keep_audio && inputs.source.has_audio {
            opts.audio = Some(AudioInput {
                path: inputs.source_path.clone(),
                start_secs: inputs.trim.start_secs,
                duration_secs: inputs.trim.duration_secs(),
            });
        }
        Box::new(FfmpegFrameSink::new(opts))
    }

    fn write_report(
        &self,
        job: &ExportJob,
        inputs: &ExportInputs,
        plan: &ExportPlan,
        stats: &PipelineStats,
    ) -> ReelmarkResult<()> {
        let path = report_path(&job.output_path);
        let report = serde_json::json!({
            "output": job.output_path,
            "format": job.config.format.as_str(),
            "width": plan.output_size.width,
            "height": plan.output_size.height,
            "fps": plan.fps,
            "trim_start_secs": inputs.trim.start_secs,
            "trim_end_secs": inputs.trim.end_secs,
            "total_frames": stats.total_frames,
            "frames_rendered": stats.frames_rendered,
            "frames_with_labels": stats.frames_with_labels,
            "labels_drawn": stats.labels_drawn,
            "elapsed_secs": stats.elapsed_secs,
            "status": if stats.is_short() { "short" } else { "ok" }
        });
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!(report = %path.display(), "Wrote export report");
        Ok(())
    }
}

impl RenderBackend for FfmpegBackend {
    fn render(
        &mut self,
        job: &ExportJob,
        progress: Option<ProgressCallback>,
    ) -> ReelmarkResult<PipelineStats> {
        let result = self.render_inner(job, progress.as_ref());
        if let (Err(err), Some(cb)) = (&result, &progress) {
            tracing::error!(error = %err, "Export failed");
            cb(ExportProgress::stage(ExportStage::Failed, 0, 0));
        }
        result
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

impl FfmpegBackend {
    fn render_inner(
        &self,
        job: &ExportJob,
        progress: Option<&ProgressCallback>,
    ) -> ReelmarkResult<PipelineStats> {
        let started = std::time::Instant::now();
        let inputs = self.load_inputs(job)?;
        let plan = self.build_plan(job, &inputs);
        tracing::info!(
            frames = plan.compositions.len(),
            size = %plan.output_size,
            fps = plan.fps,
            trim_start = inputs.trim.start_secs,
            trim_end = inputs.trim.end_secs,
            labels = inputs.project.project.labels.len(),
            "Export planned"
        );

        if let Some(cb) = progress {
            cb(ExportProgress::stage(
                ExportStage::Preparing,
                0,
                plan.compositions.len() as u64,
            ));
        }

        let compositor = self.build_compositor(job, &plan)?;
        let mut source = FfmpegFrameSource::spawn(&DecodeRequest {
            path: inputs.source_path.clone(),
            start_secs: inputs.trim.start_secs,
            duration_secs: inputs.trim.duration_secs(),
            fps: plan.fps,
            size: plan.output_size,
        })?;
        let mut sink = self.build_sink(job, &inputs);

        let stats = run_pipeline(
            &mut source,
            sink.as_mut(),
            &compositor,
            &plan.compositions,
            SinkConfig {
                size: plan.output_size,
                fps: plan.fps,
            },
            progress,
        )?;

        if let Some(cb) = progress {
            cb(ExportProgress::stage(
                ExportStage::Finalizing,
                stats.frames_rendered,
                stats.total_frames,
            ));
        }
        if let Err(err) = self.write_report(job, &inputs, &plan, &stats) {
            tracing::warn!(error = %err, "Failed to write export report");
        }
        if let Some(cb) = progress {
            cb(ExportProgress {
                progress: 1.0,
                frames_rendered: stats.frames_rendered,
                total_frames: stats.total_frames,
                eta_secs: 0.0,
                stage: ExportStage::Complete,
            });
        }

        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            frames = stats.frames_rendered,
            "Export finished"
        );
        Ok(stats)
    }
}

fn load_inputs(job: &ExportJob) -> ReelmarkResult<ExportInputs> {
    let project = LoadedProject::load(&job.project_dir)
        .map_err(|e| ReelmarkError::project(format!("Failed to load project: {e}")))?;

    let source = project
        .project
        .source
        .clone()
        .ok_or_else(|| ReelmarkError::project("Project has no source video"))?;
    let source_path = project.root.join(&source.path);
    if !source_path.exists() {
        return Err(ReelmarkError::FileNotFound { path: source_path });
    }

    let trim = job.trim_override.unwrap_or(project.project.trim);
    trim.validate(source.duration_secs)
        .map_err(|e| ReelmarkError::project(format!("Invalid trim range: {e}")))?;

    Ok(ExportInputs {
        project,
        source,
        source_path,
        trim,
    })
}

fn run_trim_only(job: &ExportJob) -> ReelmarkResult<PathBuf> {
    if job.config.format == ExportFormat::PngSequence {
        return Err(ReelmarkError::unsupported(
            "Trim-only export needs a video format",
        ));
    }
    let inputs = load_inputs(job)?;
    let size = job.config.output_size(Some(inputs.source.size()));
    ensure_parent_dir(&job.output_path)?;

    let mut args: Vec<String> = vec![
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format!("{:.6}", inputs.trim.start_secs),
        "-i".to_string(),
        inputs.source_path.to_string_lossy().into_owned(),
        "-t".to_string(),
        format!("{:.6}", inputs.trim.duration_secs()),
        "-s".to_string(),
        size.to_string(),
    ];
    if !(job.config.keep_audio && job.config.format.supports_audio()) {
        args.push("-an".to_string());
    }
    args.extend(codec_args_for_format(
        job.config.format,
        job.config.video_bitrate_kbps,
        job.config.audio_bitrate_kbps,
    ));
    args.push(job.output_path.to_string_lossy().into_owned());

    tracing::debug!(args = ?args, "Running ffmpeg trim");
    let output = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ReelmarkError::encode(format!("Failed to start ffmpeg: {e}")))?;
    if !output.status.success() {
        return Err(ReelmarkError::encode(format!(
            "ffmpeg trim failed (status {}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    tracing::info!(
        output = %job.output_path.display(),
        start = inputs.trim.start_secs,
        end = inputs.trim.end_secs,
        "Trimmed source"
    );
    Ok(job.output_path.clone())
}

/// Grab a preview frame of the source at `at_secs`, sized to the editor
/// canvas, and save it as PNG.
///
/// With a compositor, labels visible at that time are drawn on it.
pub fn write_thumbnail(
    project: &LoadedProject,
    at_secs: f64,
    output_path: &Path,
    compositor: Option<&Compositor>,
) -> ReelmarkResult<RgbaImage> {
    let source_path = project
        .source_path()
        .ok_or_else(|| ReelmarkError::project("Project has no source video"))?;
    let at_secs = thumbnail_time(at_secs, project.project.source.as_ref());
    let canvas = project.project.canvas;

    let mut frame = extract_frame(&source_path, at_secs, Some(canvas))?;

    if let Some(compositor) = compositor {
        let instant = TrimRange::new(at_secs, at_secs + 1.0 / 30.0);
        let plan = compute_compositions(&project.project.labels, &instant, canvas, canvas, 30);
        if let Some(composition) = plan.first() {
            compositor.composite(&mut frame, composition);
        }
    }

    ensure_parent_dir(output_path)?;
    frame.save(output_path)?;
    tracing::info!(
        output = %output_path.display(),
        at_secs,
        "Wrote thumbnail"
    );
    Ok(frame)
}

/// Clamp a grab time to the last frame of the source. Seeking to the exact
/// duration lands past the final frame and yields nothing.
fn thumbnail_time(at_secs: f64, source: Option<&SourceVideo>) -> f64 {
    let Some(source) = source else {
        return at_secs.max(0.0);
    };
    let fps = if source.fps > 0.0 { source.fps } else { 30.0 };
    let last_frame = (source.duration_secs - 1.0 / fps).max(0.0);
    at_secs.clamp(0.0, last_frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::InMemorySink;
    use crate::source::VecFrameSource;
    use reelmark_project_model::label::Label;
    use std::sync::{Arc, Mutex};

    fn plan(frames: usize) -> Vec<FrameComposition> {
        compute_compositions(
            &[],
            &TrimRange::new(0.0, frames as f64 / 10.0),
            CanvasSize::new(4, 4),
            CanvasSize::new(4, 4),
            10,
        )
    }

    fn cfg() -> SinkConfig {
        SinkConfig {
            size: CanvasSize::new(4, 4),
            fps: 10,
        }
    }

    #[test]
    fn test_pipeline_renders_every_planned_frame() {
        let mut source = VecFrameSource::solid(CanvasSize::new(4, 4), [1, 2, 3, 255], 10);
        let mut sink = InMemorySink::new();
        let stats = run_pipeline(
            &mut source,
            &mut sink,
            &Compositor::passthrough(),
            &plan(5),
            cfg(),
            None,
        )
        .unwrap();

        assert_eq!(stats.frames_rendered, 5);
        assert!(!stats.is_short());
        assert!(sink.ended());
        let indices: Vec<u64> = sink.frames().iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_pipeline_tolerates_short_source() {
        let mut source = VecFrameSource::solid(CanvasSize::new(4, 4), [0, 0, 0, 255], 4);
        let mut sink = InMemorySink::new();
        let stats = run_pipeline(
            &mut source,
            &mut sink,
            &Compositor::passthrough(),
            &plan(5),
            cfg(),
            None,
        )
        .unwrap();
        assert_eq!(stats.frames_rendered, 4);
        assert!(stats.is_short());
        assert!(sink.ended());
    }

    #[test]
    fn test_pipeline_empty_source_is_error() {
        let mut source = VecFrameSource::default();
        let mut sink = InMemorySink::new();
        let err = run_pipeline(
            &mut source,
            &mut sink,
            &Compositor::passthrough(),
            &plan(3),
            cfg(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ReelmarkError::Decode { .. }));
        assert!(!sink.ended());
    }

    #[test]
    fn test_pipeline_empty_plan_is_error() {
        let mut source = VecFrameSource::solid(CanvasSize::new(4, 4), [0, 0, 0, 255], 1);
        let mut sink = InMemorySink::new();
        assert!(run_pipeline(
            &mut source,
            &mut sink,
            &Compositor::passthrough(),
            &[],
            cfg(),
            None
        )
        .is_err());
        assert!(sink.config().is_none());
    }

    #[test]
    fn test_pipeline_rejects_wrong_frame_size() {
        let mut source = VecFrameSource::solid(CanvasSize::new(8, 8), [0, 0, 0, 255], 2);
        let mut sink = InMemorySink::new();
        assert!(run_pipeline(
            &mut source,
            &mut sink,
            &Compositor::passthrough(),
            &plan(2),
            cfg(),
            None
        )
        .is_err());
    }

    #[test]
    fn test_pipeline_reports_progress() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = Arc::clone(&seen);
        let cb: ProgressCallback = Box::new(move |p: ExportProgress| {
            seen_cb.lock().unwrap().push((p.stage, p.frames_rendered));
        });

        let mut source = VecFrameSource::solid(CanvasSize::new(4, 4), [0, 0, 0, 255], 3);
        let mut sink = InMemorySink::new();
        run_pipeline(
            &mut source,
            &mut sink,
            &Compositor::passthrough(),
            &plan(3),
            cfg(),
            Some(&cb),
        )
        .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (ExportStage::Rendering, 1),
                (ExportStage::Rendering, 2),
                (ExportStage::Rendering, 3),
                (ExportStage::Encoding, 3),
            ]
        );
    }

    #[test]
    fn test_pipeline_counts_labels() {
        let labels = vec![
            Label::new("a", "A", 1.0, 3.0, CanvasSize::new(4, 4)),
            Label::new("b", "B", 1.0, 3.0, CanvasSize::new(4, 4)).with_window(Some(0.2), None),
        ];
        let comps = compute_compositions(
            &labels,
            &TrimRange::new(0.0, 0.4),
            CanvasSize::new(4, 4),
            CanvasSize::new(4, 4),
            10,
        );
        let mut source = VecFrameSource::solid(CanvasSize::new(4, 4), [0, 0, 0, 255], 4);
        let mut sink = InMemorySink::new();
        let stats = run_pipeline(
            &mut source,
            &mut sink,
            &Compositor::passthrough(),
            &comps,
            cfg(),
            None,
        )
        .unwrap();
        assert_eq!(stats.frames_with_labels, 4);
        assert_eq!(stats.labels_drawn, 6);
    }

    #[test]
    fn test_progress_report_eta() {
        let report = progress_report(25, 100, 5.0);
        assert!((report.progress - 0.25).abs() < 1e-9);
        assert!((report.eta_secs - 15.0).abs() < 1e-9);
        assert_eq!(progress_report(0, 100, 1.0).eta_secs, 0.0);
    }

    fn source(duration_secs: f64, fps: f64) -> SourceVideo {
        SourceVideo {
            path: "sources/clip.mp4".to_string(),
            duration_secs,
            width: 640,
            height: 360,
            fps,
            has_audio: false,
            codec: "h264".to_string(),
        }
    }

    #[test]
    fn test_thumbnail_time_stays_on_a_frame() {
        let short = source(0.4, 25.0);
        assert!((thumbnail_time(THUMBNAIL_TIME_SECS, Some(&short)) - 0.36).abs() < 1e-9);

        let long = source(12.0, 30.0);
        assert_eq!(thumbnail_time(THUMBNAIL_TIME_SECS, Some(&long)), 0.5);
        assert_eq!(thumbnail_time(-1.0, Some(&long)), 0.0);

        let single_frame = source(0.01, 30.0);
        assert_eq!(thumbnail_time(THUMBNAIL_TIME_SECS, Some(&single_frame)), 0.0);
        assert_eq!(thumbnail_time(2.0, None), 2.0);
    }

    #[test]
    fn test_default_output_path() {
        let project = LoadedProject {
            root: PathBuf::from("/tmp/bundle"),
            project: reelmark_project_model::project::Project::new(
                "My clip: v2",
                CanvasSize::EDITOR_DEFAULT,
            ),
        };
        assert_eq!(
            default_output_path(&project, ExportFormat::Mp4H264),
            PathBuf::from("/tmp/bundle/exports/My_clip__v2.mp4")
        );
        assert_eq!(
            default_output_path(&project, ExportFormat::PngSequence),
            PathBuf::from("/tmp/bundle/exports/My_clip__v2")
        );
    }

    #[test]
    fn test_report_path_sits_next_to_output() {
        assert_eq!(
            report_path(Path::new("exports/clip.mp4")),
            PathBuf::from("exports/clip.report.json")
        );
    }

    #[tokio::test]
    async fn test_export_missing_project_dir_fails() {
        let job = ExportJob {
            project_dir: PathBuf::from("/nonexistent/reelmark/project"),
            output_path: PathBuf::from("/tmp/reelmark-out.mp4"),
            config: ExportConfig::default(),
            trim_override: None,
            font_path: None,
        };
        let err = export_project(job, None).await.unwrap_err();
        assert!(matches!(err, ReelmarkError::Render { .. }));
    }
}
