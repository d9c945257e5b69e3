//! Triangulate command implementation

use std::process::ExitCode;

use anyhow::{Context, Result};
use bonedot_backend_silhouette::triangulate::triangulate_object;
use colored::Colorize;
use serde::Serialize;

use super::reporting::CommandOutput;
use crate::input::load_scene;

#[derive(Debug, Serialize)]
struct TriangulateResult {
    object: String,
    triangles: usize,
    output: String,
}

/// Run the triangulate command
pub fn run(
    scene_path: &str,
    object: &str,
    output: Option<&str>,
    json_output: bool,
) -> Result<ExitCode> {
    let mut loaded = load_scene(scene_path)?;
    let triangles = triangulate_object(&mut loaded.scene, object)
        .with_context(|| format!("Failed to triangulate '{}'", object))?;
    let written = loaded.save(output)?;

    if json_output {
        return CommandOutput::new("triangulate", true)
            .result(TriangulateResult {
                object: object.to_string(),
                triangles,
                output: written.display().to_string(),
            })
            .print();
    }

    println!(
        "{} {} now has {} triangle(s), wrote {}",
        "SUCCESS".green().bold(),
        object,
        triangles,
        written.display()
    );
    Ok(ExitCode::SUCCESS)
}
