//! Label editing commands.

use std::path::PathBuf;

use reelmark_common::config::AppConfig;
use reelmark_project_model::label::{LabelStyle, Rgba};

/// Optional style overrides given on the command line.
pub struct StyleArgs {
    pub color: Option<String>,
    pub size: Option<f64>,
    pub background: Option<String>,
}

impl StyleArgs {
    fn apply(self, mut style: LabelStyle) -> anyhow::Result<LabelStyle> {
        if let Some(color) = self.color {
            style.color = parse_color(&color)?;
        }
        if let Some(size) = self.size {
            if !(size.is_finite() && size > 0.0) {
                anyhow::bail!("Font size must be > 0, got {size}");
            }
            style.font_size = size;
        }
        if let Some(background) = self.background {
            style.background = match background.as_str() {
                "none" => None,
                raw => Some(parse_color(raw)?),
            };
        }
        Ok(style)
    }

    fn is_empty(&self) -> bool {
        self.color.is_none() && self.size.is_none() && self.background.is_none()
    }
}

fn parse_color(raw: &str) -> anyhow::Result<Rgba> {
    raw.parse::<Rgba>().map_err(|e| anyhow::anyhow!("{e}"))
}

pub fn add(
    config: &AppConfig,
    path: PathBuf,
    text: String,
    (x, y): (f64, f64),
    (start, end): (Option<f64>, Option<f64>),
    style: StyleArgs,
) -> anyhow::Result<()> {
    let mut project = super::load_project(&path)?;

    let defaults = LabelStyle {
        color: parse_color(&config.labels.color)?,
        font_size: config.labels.font_size,
        background: None,
    };
    let style = style.apply(defaults)?;

    let id = project
        .project
        .add_label(text, x, y, style, (start, end))
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    super::save_project(&project)?;

    if let Some(label) = project.project.label(&id) {
        println!(
            "Added label {id} at ({:.1}, {:.1}) on the {} canvas",
            label.x, label.y, project.project.canvas
        );
    }
    Ok(())
}

pub fn move_to(path: PathBuf, id: String, x: f64, y: f64) -> anyhow::Result<()> {
    let mut project = super::load_project(&path)?;
    project
        .project
        .move_label(&id, x, y)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    super::save_project(&project)?;

    if let Some(label) = project.project.label(&id) {
        println!("Moved label {id} to ({:.1}, {:.1})", label.x, label.y);
    }
    Ok(())
}

pub fn edit(
    path: PathBuf,
    id: String,
    text: Option<String>,
    style: StyleArgs,
    (start, end): (Option<f64>, Option<f64>),
    always: bool,
) -> anyhow::Result<()> {
    let mut project = super::load_project(&path)?;
    let current = project
        .project
        .label(&id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Label not found: {id}"))?;

    if let Some(text) = text {
        project
            .project
            .update_label_text(&id, text)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    if !style.is_empty() {
        let style = style.apply(current.style.clone())?;
        project
            .project
            .set_label_style(&id, style)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    if always {
        project
            .project
            .set_label_window(&id, None, None)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    } else if start.is_some() || end.is_some() {
        project
            .project
            .set_label_window(
                &id,
                start.or(current.start_secs),
                end.or(current.end_secs),
            )
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }

    super::save_project(&project)?;
    println!("Updated label {id}");
    Ok(())
}

pub fn remove(path: PathBuf, id: String) -> anyhow::Result<()> {
    let mut project = super::load_project(&path)?;
    let removed = project
        .project
        .remove_label(&id)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    super::save_project(&project)?;

    println!("Removed label {id} (\"{}\")", removed.text);
    Ok(())
}

pub fn list(path: PathBuf, json: bool) -> anyhow::Result<()> {
    let project = super::load_project(&path)?;
    let labels = &project.project.labels;

    if json {
        println!("{}", serde_json::to_string_pretty(labels)?);
        return Ok(());
    }

    if labels.is_empty() {
        println!("No labels.");
        return Ok(());
    }

    println!("Labels on the {} canvas:", project.project.canvas);
    for label in labels {
        let window = match (label.start_secs, label.end_secs) {
            (None, None) => "always".to_string(),
            (start, end) => format!(
                "{} - {}",
                start.map_or("start".to_string(), |s| format!("{s:.2}s")),
                end.map_or("end".to_string(), |e| format!("{e:.2}s"))
            ),
        };
        println!(
            "  {}  ({:.1}, {:.1})  {}px {}  [{}]  {:?}",
            label.id,
            label.x,
            label.y,
            label.style.font_size,
            label.style.color,
            window,
            label.text
        );
    }
    Ok(())
}
