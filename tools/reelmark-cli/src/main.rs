//! Reelmark CLI: label, trim, and export videos from the command line.
//!
//! Usage:
//!   reelmark init <VIDEO>          Create a project bundle from a video
//!   reelmark label add <PATH> ...  Place a text label on the canvas
//!   reelmark trim <PATH> ...       Select the exported window
//!   reelmark export <PATH>         Burn labels in and re-encode
//!   reelmark thumbnail <PATH>      Write a preview image
//!   reelmark info <PATH>           Show project information
//!   reelmark validate <PATH>       Validate a project bundle
//!   reelmark check                 Check system capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use reelmark_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "reelmark",
    about = "Burn text labels into trimmed video clips",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a project bundle from a source video
    Init {
        /// Source video file
        video: PathBuf,

        /// Project name (defaults to the video file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Parent directory for the project bundle
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show project information
    Info {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Validate a project bundle
    Validate {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Add, move, edit, remove, or list labels
    Label {
        #[command(subcommand)]
        action: LabelCommand,
    },

    /// Set the trim range exported from the source
    Trim {
        /// Path to the project directory
        path: PathBuf,

        /// Start time in seconds
        #[arg(long)]
        start: f64,

        /// End time in seconds
        #[arg(long)]
        end: f64,
    },

    /// Export the trimmed clip with labels burned in
    Export {
        /// Path to the project directory
        path: PathBuf,

        /// Output file path (a directory for png-sequence)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: mp4-h264, mp4-h265, webm, gif, png-sequence
        #[arg(long)]
        format: Option<String>,

        /// Output width (0 = source width)
        #[arg(long)]
        width: Option<u32>,

        /// Output height (0 = source height)
        #[arg(long)]
        height: Option<u32>,

        /// Output frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Drop the source audio
        #[arg(long)]
        no_audio: bool,

        /// Only cut the trim window, without drawing labels
        #[arg(long)]
        trim_only: bool,
    },

    /// Write a preview image of the source
    Thumbnail {
        /// Path to the project directory
        path: PathBuf,

        /// Source time in seconds
        #[arg(long, default_value = "0.5")]
        at: f64,

        /// Output PNG path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Draw the labels visible at that time
        #[arg(long)]
        with_labels: bool,
    },

    /// Check system capabilities
    Check,
}

#[derive(Subcommand)]
enum LabelCommand {
    /// Place a new label (coordinates are editor-canvas pixels)
    Add {
        /// Path to the project directory
        path: PathBuf,

        /// Label text
        text: String,

        /// Baseline-left X
        #[arg(long)]
        x: f64,

        /// Baseline Y
        #[arg(long)]
        y: f64,

        /// Source time the label appears at
        #[arg(long)]
        start: Option<f64>,

        /// Source time the label disappears at
        #[arg(long)]
        end: Option<f64>,

        /// Text color (#rrggbb, #rrggbbaa, or a name)
        #[arg(long)]
        color: Option<String>,

        /// Font size in canvas pixels
        #[arg(long)]
        size: Option<f64>,

        /// Background box color
        #[arg(long)]
        background: Option<String>,
    },

    /// Move a label
    Move {
        /// Path to the project directory
        path: PathBuf,

        /// Label id
        id: String,

        #[arg(long)]
        x: f64,

        #[arg(long)]
        y: f64,
    },

    /// Change a label's text, style, or visibility window
    Edit {
        /// Path to the project directory
        path: PathBuf,

        /// Label id
        id: String,

        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        color: Option<String>,

        #[arg(long)]
        size: Option<f64>,

        #[arg(long)]
        background: Option<String>,

        #[arg(long)]
        start: Option<f64>,

        #[arg(long)]
        end: Option<f64>,

        /// Make the label visible for the whole video
        #[arg(long, conflicts_with_all = ["start", "end"])]
        always: bool,
    },

    /// Delete a label
    Remove {
        /// Path to the project directory
        path: PathBuf,

        /// Label id
        id: String,
    },

    /// List labels
    List {
        /// Path to the project directory
        path: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_error) = AppConfig::load_deferred();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    reelmark_common::logging::init_logging(&logging);
    if let Some(e) = config_error {
        tracing::warn!("{}; using default settings", e);
    }

    match cli.command {
        Commands::Init {
            video,
            name,
            output,
        } => commands::init::run(&config, video, name, output),
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Label { action } => match action {
            LabelCommand::Add {
                path,
                text,
                x,
                y,
                start,
                end,
                color,
                size,
                background,
            } => commands::label::add(
                &config,
                path,
                text,
                (x, y),
                (start, end),
                commands::label::StyleArgs {
                    color,
                    size,
                    background,
                },
            ),
            LabelCommand::Move { path, id, x, y } => commands::label::move_to(path, id, x, y),
            LabelCommand::Edit {
                path,
                id,
                text,
                color,
                size,
                background,
                start,
                end,
                always,
            } => commands::label::edit(
                path,
                id,
                text,
                commands::label::StyleArgs {
                    color,
                    size,
                    background,
                },
                (start, end),
                always,
            ),
            LabelCommand::Remove { path, id } => commands::label::remove(path, id),
            LabelCommand::List { path, json } => commands::label::list(path, json),
        },
        Commands::Trim { path, start, end } => commands::trim::run(path, start, end),
        Commands::Export {
            path,
            output,
            format,
            width,
            height,
            fps,
            no_audio,
            trim_only,
        } => {
            commands::export::run(
                &config,
                path,
                output,
                commands::export::Overrides {
                    format,
                    width,
                    height,
                    fps,
                    no_audio,
                },
                trim_only,
            )
            .await
        }
        Commands::Thumbnail {
            path,
            at,
            output,
            with_labels,
        } => commands::thumbnail::run(&config, path, at, output, with_labels),
        Commands::Check => commands::check::run(&config),
    }
}
