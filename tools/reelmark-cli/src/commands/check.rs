//! Check system capabilities.

use reelmark_common::config::{config_file_path, AppConfig};
use reelmark_render_engine::probe::command_exists;
use reelmark_render_engine::LabelRasterizer;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Reelmark System Check");
    println!("{}", "=".repeat(50));

    let mut all_ok = true;
    for (binary, purpose) in [
        ("ffmpeg", "decode and encode"),
        ("ffprobe", "probe source videos"),
    ] {
        if command_exists(binary) {
            println!("[OK] {binary} ({purpose})");
        } else {
            println!("[MISSING] {binary} ({purpose}): install ffmpeg and add it to PATH");
            all_ok = false;
        }
    }

    match LabelRasterizer::discover(&config.labels) {
        Ok(font) => println!("[OK] Label font: {}", font.source().display()),
        Err(e) => {
            println!("[MISSING] Label font: {e}");
            all_ok = false;
        }
    }

    let config_path = config_file_path();
    println!(
        "[INFO] Config file: {}{}",
        config_path.display(),
        if config_path.exists() { "" } else { " (defaults)" }
    );
    println!("[INFO] Projects directory: {}", config.projects_dir.display());

    println!();
    if all_ok {
        println!("All required tools are available. Reelmark is ready.");
    } else {
        println!("Some requirements are missing. See above for fixes.");
    }

    Ok(())
}
