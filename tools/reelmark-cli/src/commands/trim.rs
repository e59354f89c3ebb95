//! Set the exported trim range.

use std::path::PathBuf;

use reelmark_project_model::TrimRange;

pub fn run(path: PathBuf, start: f64, end: f64) -> anyhow::Result<()> {
    let mut project = super::load_project(&path)?;

    project
        .project
        .set_trim(TrimRange::new(start, end))
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    super::save_project(&project)?;

    let trim = project.project.trim;
    println!(
        "Trim set to {:.3}s - {:.3}s ({:.3}s)",
        trim.start_secs,
        trim.end_secs,
        trim.duration_secs()
    );
    Ok(())
}
