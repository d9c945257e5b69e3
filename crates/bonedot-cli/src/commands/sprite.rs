//! Sprite command implementation
//!
//! Imports PNG files as sprite quads into a scene document.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bonedot_backend_silhouette::sprite::{import_sprites, sprite_files};
use bonedot_spec::SpriteContext;
use colored::Colorize;

use super::reporting::{print_report, print_summary, CommandOutput};
use crate::input::load_scene;

/// Expands directories to the PNG files directly inside them.
pub fn collect_images(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        let path = PathBuf::from(input);
        if path.is_dir() {
            let files = sprite_files(&path)
                .with_context(|| format!("Failed to list sprites in {}", path.display()))?;
            paths.extend(files);
        } else {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Run the sprite command
///
/// # Arguments
/// * `scene_path` - Scene document to import into
/// * `images` - PNG files or directories of PNG files
/// * `active` - Object whose sprite object becomes the parent
/// * `scale` - Units per pixel
/// * `output` - Where to write the scene (default: in place)
pub fn run(
    scene_path: &str,
    images: &[String],
    active: Option<&str>,
    scale: f64,
    output: Option<&str>,
    json_output: bool,
) -> Result<ExitCode> {
    let mut loaded = load_scene(scene_path)?;
    let paths = collect_images(images)?;

    let mut context = SpriteContext::new();
    let report = import_sprites(&mut loaded.scene, &paths, &mut context, active, scale);
    let written = loaded.save(output)?;

    if json_output {
        return CommandOutput::new("sprite", report.ok)
            .report(&report)
            .result(written.display().to_string())
            .print();
    }

    println!("{} {} image(s)", "Importing:".cyan().bold(), paths.len());
    if let Some(parent) = context.last_sprite_object() {
        println!("{} {}", "Parent:".dimmed(), parent);
    }
    print_report(&report);
    println!("{} {}", "Wrote:".dimmed(), written.display());
    Ok(print_summary(&report, "Imported"))
}
