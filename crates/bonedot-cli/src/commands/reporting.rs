//! Shared output helpers for commands.

use std::process::ExitCode;

use anyhow::Result;
use bonedot_spec::{BatchReport, ObjectStatus};
use colored::Colorize;
use serde::Serialize;

/// JSON envelope printed by every command in `--json` mode.
#[derive(Debug, Serialize)]
pub(crate) struct CommandOutput<'a, T: Serialize> {
    pub success: bool,
    pub command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<&'a BatchReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl<'a, T: Serialize> CommandOutput<'a, T> {
    pub fn new(command: &'a str, success: bool) -> Self {
        Self {
            success,
            command,
            report: None,
            result: None,
            errors: Vec::new(),
        }
    }

    pub fn report(mut self, report: &'a BatchReport) -> Self {
        self.report = Some(report);
        self
    }

    pub fn result(mut self, result: T) -> Self {
        self.result = Some(result);
        self
    }

    pub fn errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    /// Prints the envelope and returns the matching exit code.
    pub fn print(&self) -> Result<ExitCode> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(exit_code(self.success))
    }
}

pub(crate) fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Prints one line per report entry.
pub(crate) fn print_report(report: &BatchReport) {
    for entry in &report.entries {
        match (&entry.status, &entry.error) {
            (ObjectStatus::Finished, _) => {
                println!("  {} {}", "ok".green(), entry.object);
            }
            (status, Some(error)) => {
                let label = match status {
                    ObjectStatus::Skipped => "skipped".yellow(),
                    _ => "cancelled".red(),
                };
                let code = error.backend_code.as_deref().unwrap_or(&error.code);
                println!(
                    "  {} {} [{}] {}",
                    label,
                    entry.object,
                    code.dimmed(),
                    error.message
                );
            }
            (_, None) => {
                println!("  {} {}", "?".yellow(), entry.object);
            }
        }
    }
}

/// Prints the closing SUCCESS/FAILED line.
pub(crate) fn print_summary(report: &BatchReport, what: &str) -> ExitCode {
    let total = report.entries.len();
    if report.ok {
        println!(
            "\n{} {} {} object(s)",
            "SUCCESS".green().bold(),
            what,
            report.finished_count()
        );
    } else {
        println!(
            "\n{} {} {}/{} object(s)",
            "FAILED".red().bold(),
            what,
            report.finished_count(),
            total
        );
    }
    exit_code(report.ok)
}
