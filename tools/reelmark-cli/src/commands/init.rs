//! Create a project bundle from a source video.

use std::path::PathBuf;

use reelmark_common::config::AppConfig;
use reelmark_project_model::project::{ExportConfig, ExportFormat};
use reelmark_project_model::{CanvasSize, LoadedProject};
use reelmark_render_engine::export::{write_thumbnail, THUMBNAIL_TIME_SECS};
use reelmark_render_engine::probe::probe_video;

pub fn run(
    config: &AppConfig,
    video: PathBuf,
    name: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let name = name
        .or_else(|| {
            video
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .ok_or_else(|| anyhow::anyhow!("Cannot derive a project name from {}", video.display()))?;

    let info = probe_video(&video)
        .map_err(|e| anyhow::anyhow!("Failed to probe {}: {e}", video.display()))?;

    let project_dir = output.unwrap_or_else(|| config.projects_dir.clone()).join(&name);
    println!("Creating project '{}' at {}", name, project_dir.display());

    let canvas = CanvasSize::new(config.canvas.width, config.canvas.height);
    let mut project = LoadedProject::create(&project_dir, &name, canvas)
        .map_err(|e| anyhow::anyhow!("Failed to create project: {e}"))?;

    project.project.export = export_defaults(config)?;
    project
        .import_source(&video, info.clone().into_source())
        .map_err(|e| anyhow::anyhow!("Failed to import {}: {e}", video.display()))?;
    super::save_project(&project)?;

    let preview = project.root.join("cache").join("preview.png");
    if let Err(err) = write_thumbnail(&project, THUMBNAIL_TIME_SECS, &preview, None) {
        tracing::warn!(error = %err, "Could not write preview thumbnail");
    }

    println!("Project created successfully:");
    println!("  Directory: {}", project.root.display());
    println!(
        "  Source: {}x{} @ {:.2}fps, {:.2}s{}",
        info.width,
        info.height,
        info.fps,
        info.duration_secs,
        if info.has_audio { ", with audio" } else { "" }
    );
    println!(
        "  Trim: {:.2}s - {:.2}s",
        project.project.trim.start_secs, project.project.trim.end_secs
    );
    println!("  Canvas: {canvas}");
    println!();
    println!("Directory structure:");
    println!("  {}/", name);
    println!("  ├── sources/     (imported video)");
    println!("  ├── meta/        (project.json)");
    println!("  ├── cache/       (preview thumbnail)");
    println!("  └── exports/     (rendered output)");

    Ok(())
}

fn export_defaults(config: &AppConfig) -> anyhow::Result<ExportConfig> {
    let format: ExportFormat = config
        .export
        .format
        .parse()
        .map_err(|e: String| anyhow::anyhow!("Invalid export format in config: {e}"))?;
    Ok(ExportConfig {
        format,
        fps: config.export.fps,
        video_bitrate_kbps: config.export.video_bitrate_kbps,
        audio_bitrate_kbps: config.export.audio_bitrate_kbps,
        keep_audio: config.export.keep_audio,
        ..ExportConfig::default()
    })
}
