//! Validate a Reelmark project bundle.

use std::path::PathBuf;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let project = super::load_project(&path)?;

    println!("  Name: {}", project.project.name);
    println!("  Version: {}", project.project.version);
    println!("  Canvas: {}", project.project.canvas);
    println!("  Labels: {}", project.project.labels.len());

    let errors = project.validate_sources();
    if errors.is_empty() {
        println!("  Sources: All present");
        println!("\nProject is valid.");
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        println!(
            "\n{} issue(s) found. Project may not export correctly.",
            errors.len()
        );
    }

    Ok(())
}
