//! Trace command implementation
//!
//! Runs the silhouette steps on a PNG (mask, contour, stride, local mapping)
//! and prints the resulting cutter outline.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bonedot_backend_silhouette::image::load_png;
use bonedot_backend_silhouette::{build_mask, simplify, trace, LocalPoint, PixelMapper};
use bonedot_spec::CutConfig;
use colored::Colorize;
use serde::Serialize;

use super::reporting::{exit_code, CommandOutput};

/// What the silhouette steps produced for one image.
#[derive(Debug, Serialize)]
pub struct TraceSummary {
    pub width: u32,
    pub height: u32,
    pub opaque_pixels: usize,
    pub contour_points: usize,
    pub truncated: bool,
    pub stride: usize,
    pub polygon: Vec<[f64; 2]>,
}

impl TraceSummary {
    /// True when the outline can become a cutter face.
    pub fn is_cuttable(&self) -> bool {
        self.polygon.len() >= 3
    }
}

/// Runs the silhouette steps without touching any scene.
pub fn summarize(path: &Path, config: &CutConfig) -> Result<TraceSummary> {
    let image = load_png(path).with_context(|| format!("Failed to load image: {}", path.display()))?;
    let mask = build_mask(&image, config.alpha_threshold);
    let contour = trace(&mask);
    let kept = simplify(contour.points(), config.stride);
    let mapper = PixelMapper::new(image.width(), image.height(), config.scale);
    let polygon = mapper
        .map_all(&kept)
        .into_iter()
        .map(|LocalPoint { x, y }| [x, y])
        .collect();

    Ok(TraceSummary {
        width: image.width(),
        height: image.height(),
        opaque_pixels: mask.opaque_count(),
        contour_points: contour.len(),
        truncated: contour.is_truncated(),
        stride: config.stride.max(1),
        polygon,
    })
}

/// Run the trace command
///
/// # Returns
/// Exit code: 0 when the outline has at least three points, 1 otherwise
pub fn run(image: &str, config: &CutConfig, json_output: bool) -> Result<ExitCode> {
    let summary = summarize(Path::new(image), config)?;
    let cuttable = summary.is_cuttable();

    if json_output {
        return CommandOutput::new("trace", cuttable).result(&summary).print();
    }

    println!("{} {}", "Tracing:".cyan().bold(), image);
    println!(
        "{} {}x{}, {} opaque pixel(s)",
        "Image:".dimmed(),
        summary.width,
        summary.height,
        summary.opaque_pixels
    );
    println!(
        "{} {} point(s), stride {} -> {} point(s)",
        "Contour:".dimmed(),
        summary.contour_points,
        summary.stride,
        summary.polygon.len()
    );
    if summary.truncated {
        println!("  {} contour walk hit its step bound", "!".yellow());
    }
    for [x, y] in &summary.polygon {
        println!("  ({:.6}, {:.6})", x, y);
    }

    if cuttable {
        println!("\n{} Outline ready for cutting", "SUCCESS".green().bold());
    } else {
        println!(
            "\n{} Degenerate outline ({} point(s)), cut would be skipped",
            "FAILED".red().bold(),
            summary.polygon.len()
        );
    }
    Ok(exit_code(cuttable))
}
