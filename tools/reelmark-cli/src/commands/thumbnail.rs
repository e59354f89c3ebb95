//! Write a preview image of the source video.

use std::path::PathBuf;

use reelmark_common::config::AppConfig;
use reelmark_render_engine::export::write_thumbnail;
use reelmark_render_engine::{Compositor, LabelRasterizer};

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    at: f64,
    output: Option<PathBuf>,
    with_labels: bool,
) -> anyhow::Result<()> {
    let project = super::load_project(&path)?;
    let output = output.unwrap_or_else(|| project.root.join("cache").join("preview.png"));

    let compositor = if with_labels {
        Some(Compositor::new(LabelRasterizer::discover(&config.labels)?))
    } else {
        None
    };

    let frame = write_thumbnail(&project, at, &output, compositor.as_ref())?;
    println!(
        "Wrote {}x{} thumbnail at {:.2}s: {}",
        frame.width(),
        frame.height(),
        at,
        output.display()
    );
    Ok(())
}
