//! Export a project to video.

use std::path::PathBuf;

use reelmark_common::config::AppConfig;
use reelmark_project_model::project::ExportFormat;
use reelmark_render_engine::export::{
    default_output_path, export_project, report_path, trim_only, ExportJob, ExportProgress,
    ExportStage,
};

/// Command-line overrides of the project's export settings.
pub struct Overrides {
    pub format: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub no_audio: bool,
}

pub async fn run(
    app: &AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    overrides: Overrides,
    trim_only_mode: bool,
) -> anyhow::Result<()> {
    println!("Exporting project at: {}", path.display());

    let project = super::load_project(&path)?;
    let mut config = project.project.export.clone();

    if let Some(format) = overrides.format {
        config.format = format
            .parse::<ExportFormat>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    if let Some(width) = overrides.width {
        config.width = width;
    }
    if let Some(height) = overrides.height {
        config.height = height;
    }
    if let Some(fps) = overrides.fps {
        anyhow::ensure!(fps > 0, "fps must be > 0");
        config.fps = fps;
    }
    if overrides.no_audio {
        config.keep_audio = false;
    }

    let output_path = output.unwrap_or_else(|| default_output_path(&project, config.format));
    let size = config.output_size(project.project.source.as_ref().map(|s| s.size()));
    let trim = project.project.trim;

    println!("  Output: {}", output_path.display());
    println!("  Format: {}", config.format.as_str());
    println!("  Resolution: {} @ {}fps", size, config.fps);
    println!(
        "  Trim: {:.3}s - {:.3}s",
        trim.start_secs, trim.end_secs
    );
    if !trim_only_mode {
        println!("  Labels: {}", project.project.labels.len());
    }

    let job = ExportJob {
        project_dir: path,
        output_path: output_path.clone(),
        config,
        trim_override: None,
        font_path: app.labels.font_path.clone(),
    };

    if trim_only_mode {
        trim_only(job)
            .await
            .map_err(|e| anyhow::anyhow!("Trim failed: {e}"))?;
        println!("Trim complete: {}", output_path.display());
        return Ok(());
    }

    let progress_cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(|p| match p.stage {
        ExportStage::Rendering => print!(
            "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.frames_rendered,
            p.total_frames,
            p.eta_secs,
        ),
        ExportStage::Encoding => print!("\r  Finishing encode...{:40}", ""),
        _ => {}
    });

    match export_project(job, Some(progress_cb)).await {
        Ok(_) => {
            println!("\nExport complete: {}", output_path.display());
            println!("  Report: {}", report_path(&output_path).display());
            Ok(())
        }
        Err(e) => {
            println!();
            Err(anyhow::anyhow!("Export failed: {e}"))
        }
    }
}
