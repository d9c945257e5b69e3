//! Cutter command implementation
//!
//! Validates sprite planes in a scene document and writes the cutter mesh
//! each one would be knife-projected with. The cut itself needs the host,
//! so this command stops after building the cutter.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bonedot_backend_silhouette::{inspect_scene, CutPipeline, CutterMesh};
use bonedot_spec::{BatchReport, CutConfig};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use super::reporting::{print_report, print_summary, CommandOutput};
use crate::input::load_scene;

/// A cutter ready to be linked into the host.
#[derive(Debug, Serialize)]
pub struct CutterPlan {
    /// Object the cutter is for.
    pub object: String,
    /// World location to link the cutter at.
    pub location: [f64; 3],
    pub mesh: CutterMesh,
}

/// Builds a cutter for every object, recording failures in the report.
pub fn plan_cutters(
    scene_path: &str,
    objects: &[String],
    config: &CutConfig,
) -> Result<(Vec<CutterPlan>, BatchReport)> {
    let loaded = load_scene(scene_path)?;
    let pipeline = CutPipeline::new(config.clone());

    let mut plans = Vec::new();
    let mut report = BatchReport::new();
    for object in objects {
        let prepared = inspect_scene(&loaded.scene, object, &loaded.base_dir).and_then(|target| {
            let mesh = pipeline.prepare(&target)?;
            Ok(CutterPlan {
                object: object.clone(),
                location: pipeline.cutter_location(&target),
                mesh,
            })
        });
        match prepared {
            Ok(plan) => {
                report.finished(object.as_str());
                plans.push(plan);
            }
            Err(err) => report.failed_with(object.as_str(), &err),
        }
    }
    Ok((plans, report))
}

fn write_plan(plan: &CutterPlan, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(format!("{}_cutter.json", plan.object));
    let json = serde_json::to_string_pretty(plan)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Run the cutter command
///
/// # Arguments
/// * `scene_path` - Scene document
/// * `objects` - Sprite plane objects to build cutters for
/// * `out_dir` - Directory for `<object>_cutter.json` files (none: print only)
///
/// # Returns
/// Exit code: 0 if every object got a cutter, 1 otherwise
pub fn run(
    scene_path: &str,
    objects: &[String],
    out_dir: Option<&str>,
    config: &CutConfig,
    json_output: bool,
) -> Result<ExitCode> {
    if objects.is_empty() {
        anyhow::bail!("no objects given, name at least one sprite plane");
    }

    let (plans, report) = plan_cutters(scene_path, objects, config)?;

    let mut written = Vec::new();
    if let Some(dir) = out_dir {
        let dir = Path::new(dir);
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        for plan in &plans {
            written.push(write_plan(plan, dir)?);
        }
        info!(files = written.len(), dir = %dir.display(), "Wrote cutter meshes");
    }

    if json_output {
        return CommandOutput::new("cutter", report.ok)
            .report(&report)
            .result(&plans)
            .print();
    }

    println!("{} {}", "Cutters:".cyan().bold(), scene_path);
    print_report(&report);
    for plan in &plans {
        println!(
            "  {} {} vertices at ({:.4}, {:.4}, {:.4})",
            plan.object.dimmed(),
            plan.mesh.vertices.len(),
            plan.location[0],
            plan.location[1],
            plan.location[2]
        );
    }
    for path in &written {
        println!("{} {}", "Wrote:".dimmed(), path.display());
    }
    Ok(print_summary(&report, "Built cutters for"))
}
