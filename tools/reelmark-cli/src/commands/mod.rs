pub mod check;
pub mod export;
pub mod info;
pub mod init;
pub mod label;
pub mod thumbnail;
pub mod trim;
pub mod validate;

use std::path::Path;

use reelmark_project_model::LoadedProject;

pub(crate) fn load_project(path: &Path) -> anyhow::Result<LoadedProject> {
    LoadedProject::load(path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))
}

pub(crate) fn save_project(project: &LoadedProject) -> anyhow::Result<()> {
    project
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))
}
