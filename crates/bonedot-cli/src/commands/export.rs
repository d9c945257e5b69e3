//! Export command implementation
//!
//! Exports armatures from a scene document to a `.bdsket` file.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bonedot_backend_rig::{DocumentHost, Exporter};
use bonedot_spec::export::validate_document;
use bonedot_spec::ExportConfig;
use colored::Colorize;
use serde::Serialize;

use super::reporting::{print_report, print_summary, CommandOutput};
use crate::input::load_scene;

#[derive(Debug, Serialize)]
struct ExportResult<'a> {
    output: &'a str,
    hash: String,
    armatures: usize,
    animations: usize,
}

/// Run the export command
///
/// # Arguments
/// * `scene_path` - Scene document
/// * `objects` - Selected objects; non-armatures are reported and skipped
/// * `output` - Path of the `.bdsket` file
///
/// # Returns
/// Exit code: 0 if every selected object exported, 1 otherwise
pub fn run(
    scene_path: &str,
    objects: &[String],
    output: &str,
    config: &ExportConfig,
    json_output: bool,
) -> Result<ExitCode> {
    let loaded = load_scene(scene_path)?;
    let mut host = DocumentHost::new(loaded.scene);
    let exporter = Exporter::new(config.clone());

    let (doc, report) = exporter
        .export(&mut host, objects)
        .context("Export failed")?;

    let problems: Vec<String> = validate_document(&doc)
        .iter()
        .map(ToString::to_string)
        .collect();
    let hash = doc
        .write(Path::new(output), config.pretty)
        .with_context(|| format!("Failed to write export: {}", output))?;

    let animations = doc.armatures.iter().map(|a| a.animations.len()).sum();
    if json_output {
        return CommandOutput::new("export", report.ok && problems.is_empty())
            .report(&report)
            .result(ExportResult {
                output,
                hash,
                armatures: doc.armatures.len(),
                animations,
            })
            .errors(problems)
            .print();
    }

    println!("{} {}", "Exporting:".cyan().bold(), scene_path);
    print_report(&report);
    for armature in &doc.armatures {
        println!(
            "  {} {} bone(s), {} mesh(es), {} texture(s), {} animation(s)",
            armature.name.dimmed(),
            armature.bones.len(),
            armature.meshes.len(),
            armature.textures.len(),
            armature.animations.len()
        );
    }
    for problem in &problems {
        println!("  {} {}", "!".yellow(), problem);
    }
    println!("{} {} ({})", "Wrote:".dimmed(), output, &hash[..16]);

    Ok(print_summary(&report, "Exported"))
}
