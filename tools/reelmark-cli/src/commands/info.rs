//! Show project information.

use std::path::PathBuf;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let project = super::load_project(&path)?;
    let p = &project.project;

    println!("Project: {}", p.name);
    println!("  ID: {}", p.id);
    println!("  Created: {}", p.created_at);
    println!("  Modified: {}", p.modified_at);
    println!();

    println!("Source:");
    match &p.source {
        Some(s) => {
            println!("  Path: {}", s.path);
            println!(
                "  Video: {}x{} @ {:.2}fps, {:.2}s ({})",
                s.width, s.height, s.fps, s.duration_secs, s.codec
            );
            println!("  Audio: {}", if s.has_audio { "yes" } else { "no" });
        }
        None => println!("  (none imported)"),
    }
    println!();

    println!("Editing:");
    println!("  Canvas: {}", p.canvas);
    println!(
        "  Trim: {:.3}s - {:.3}s ({:.3}s)",
        p.trim.start_secs,
        p.trim.end_secs,
        p.trim.duration_secs()
    );
    println!("  Labels: {}", p.labels.len());
    println!();

    let output = p.export.output_size(p.source.as_ref().map(|s| s.size()));
    println!("Export config:");
    println!("  Format: {}", p.export.format.as_str());
    println!("  Output: {} @ {}fps", output, p.export.fps);
    println!(
        "  Bitrate: {} kbps video, {} kbps audio",
        p.export.video_bitrate_kbps, p.export.audio_bitrate_kbps
    );
    println!("  Keep audio: {}", p.export.keep_audio);

    Ok(())
}
