//! UV sync command implementation
//!
//! Moves mesh vertices to match their UV coordinates on the sprite image.

use std::process::ExitCode;

use anyhow::{Context, Result};
use bonedot_backend_silhouette::uv_sync::sync_uvs;
use colored::Colorize;
use serde::Serialize;

use super::reporting::CommandOutput;
use crate::input::load_scene;

#[derive(Debug, Serialize)]
struct SyncResult {
    object: String,
    loops: usize,
    output: String,
}

/// Run the uv-sync command
pub fn run(
    scene_path: &str,
    object: &str,
    scale: f64,
    output: Option<&str>,
    json_output: bool,
) -> Result<ExitCode> {
    let mut loaded = load_scene(scene_path)?;
    let loops = sync_uvs(&mut loaded.scene, object, scale)
        .with_context(|| format!("Failed to sync UVs of '{}'", object))?;
    let written = loaded.save(output)?;

    if json_output {
        return CommandOutput::new("uv-sync", true)
            .result(SyncResult {
                object: object.to_string(),
                loops,
                output: written.display().to_string(),
            })
            .print();
    }

    println!(
        "{} {} loop(s) of {} synced, wrote {}",
        "SUCCESS".green().bold(),
        loops,
        object,
        written.display()
    );
    Ok(ExitCode::SUCCESS)
}
