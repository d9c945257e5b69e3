//! BoneDot CLI - silhouette cutters and skeletal animation export
//!
//! This binary runs the BoneDot pipelines against PNG files and scene
//! documents.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use bonedot_cli::{commands, input, logging};

/// BoneDot - 2D skeletal animation tooling
#[derive(Parser)]
#[command(name = "bonedot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: $BONEDOT_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace the alpha silhouette of a PNG and print the cutter outline
    Trace {
        /// Path to the PNG image
        image: String,

        /// Minimum alpha counted as opaque
        #[arg(long)]
        threshold: Option<u8>,

        /// Keep every Nth contour point
        #[arg(long)]
        stride: Option<usize>,

        /// Units per pixel
        #[arg(long)]
        scale: Option<f64>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Build cutter meshes for sprite planes in a scene document
    Cutter {
        /// Path to the scene document
        #[arg(short, long)]
        scene: String,

        /// Sprite plane objects
        objects: Vec<String>,

        /// Directory for <object>_cutter.json files
        #[arg(short, long)]
        out_dir: Option<String>,

        /// Keep every Nth contour point
        #[arg(long)]
        stride: Option<usize>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Export armatures from a scene document to .bdsket
    Export {
        /// Path to the scene document
        #[arg(short, long)]
        scene: String,

        /// Selected objects (armatures)
        objects: Vec<String>,

        /// Output .bdsket path
        #[arg(short, long)]
        output: String,

        /// Keyframe compression tolerance
        #[arg(long)]
        epsilon: Option<f64>,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Validate a .bdsket file
    Validate {
        /// Path to the .bdsket file
        file: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Import PNG files (or directories of them) as sprite quads
    Sprite {
        /// Path to the scene document
        #[arg(short, long)]
        scene: String,

        /// PNG files or directories
        #[arg(required = true)]
        images: Vec<String>,

        /// Object whose sprite object becomes the parent
        #[arg(long)]
        active: Option<String>,

        /// Units per pixel
        #[arg(long)]
        scale: Option<f64>,

        /// Write the scene here instead of in place
        #[arg(short, long)]
        output: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Move mesh vertices to match their UVs on the sprite image
    UvSync {
        /// Path to the scene document
        #[arg(short, long)]
        scene: String,

        /// Mesh object
        object: String,

        /// Units per pixel
        #[arg(long)]
        scale: Option<f64>,

        /// Write the scene here instead of in place
        #[arg(short, long)]
        output: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Fan-triangulate every polygon of a mesh
    Triangulate {
        /// Path to the scene document
        #[arg(short, long)]
        scene: String,

        /// Mesh object
        object: String,

        /// Write the scene here instead of in place
        #[arg(short, long)]
        output: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = input::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Trace {
            image,
            threshold,
            stride,
            scale,
            json,
        } => {
            let mut cut = config.cut;
            if let Some(threshold) = threshold {
                cut = cut.alpha_threshold(threshold);
            }
            if let Some(stride) = stride {
                cut = cut.stride(stride);
            }
            if let Some(scale) = scale {
                cut = cut.scale(scale);
            }
            commands::trace::run(&image, &cut, json)
        }
        Commands::Cutter {
            scene,
            objects,
            out_dir,
            stride,
            json,
        } => {
            let mut cut = config.cut;
            if let Some(stride) = stride {
                cut = cut.stride(stride);
            }
            commands::cutter::run(&scene, &objects, out_dir.as_deref(), &cut, json)
        }
        Commands::Export {
            scene,
            objects,
            output,
            epsilon,
            compact,
            json,
        } => {
            let mut export = config.export;
            if let Some(epsilon) = epsilon {
                export = export.epsilon(epsilon);
            }
            if compact {
                export = export.pretty(false);
            }
            commands::export::run(&scene, &objects, &output, &export, json)
        }
        Commands::Validate { file, json } => commands::validate::run(&file, json),
        Commands::Sprite {
            scene,
            images,
            active,
            scale,
            output,
            json,
        } => commands::sprite::run(
            &scene,
            &images,
            active.as_deref(),
            scale.unwrap_or(config.cut.scale),
            output.as_deref(),
            json,
        ),
        Commands::UvSync {
            scene,
            object,
            scale,
            output,
            json,
        } => commands::uv_sync::run(
            &scene,
            &object,
            scale.unwrap_or(config.cut.scale),
            output.as_deref(),
            json,
        ),
        Commands::Triangulate {
            scene,
            object,
            output,
            json,
        } => commands::triangulate::run(&scene, &object, output.as_deref(), json),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
