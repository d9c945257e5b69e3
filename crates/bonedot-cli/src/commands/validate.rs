//! Validate command implementation
//!
//! Checks a `.bdsket` file for structural problems.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bonedot_spec::export::validate_document;
use bonedot_spec::ExportDocument;
use colored::Colorize;
use serde::Serialize;

use super::reporting::{exit_code, CommandOutput};

#[derive(Debug, Serialize)]
struct Problem {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

/// Run the validate command
///
/// # Returns
/// Exit code: 0 if valid, 1 if invalid
pub fn run(file: &str, json_output: bool) -> Result<ExitCode> {
    let doc = ExportDocument::read(Path::new(file))
        .with_context(|| format!("Failed to read export: {}", file))?;
    let errors = validate_document(&doc);
    let valid = errors.is_empty();

    if json_output {
        let problems: Vec<Problem> = errors
            .into_iter()
            .map(|e| Problem {
                code: e.code.code(),
                message: e.message,
                path: e.path,
            })
            .collect();
        return CommandOutput::new("validate", valid).result(problems).print();
    }

    println!("{} {}", "Validating:".cyan().bold(), file);
    for error in &errors {
        println!("  {} {}", "x".red(), error);
    }

    if valid {
        println!(
            "\n{} {} armature(s) valid",
            "SUCCESS".green().bold(),
            doc.armatures.len()
        );
    } else {
        println!(
            "\n{} {} error(s)",
            "FAILED".red().bold(),
            errors.len()
        );
    }
    Ok(exit_code(valid))
}
