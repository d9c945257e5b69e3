//! Batch reports.
//!
//! Batch operations (cutting every selected sprite, exporting every selected
//! armature) never abort on the first failure. Each object gets an entry with
//! its outcome, and the report as a whole is `ok` only when nothing failed.

use serde::{Deserialize, Serialize};

use crate::error::{BackendError, ErrorCode};

/// Outcome for a single object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStatus {
    /// The operation completed.
    Finished,
    /// Degenerate input; the object was left untouched.
    Skipped,
    /// Invalid input or a host failure; the operation was cancelled for this object.
    Cancelled,
}

/// Error entry in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportError {
    /// Shared error code (e.g., "E011").
    pub code: String,
    /// Backend-specific code (e.g., "SILHOUETTE_009").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_code: Option<String>,
    /// Human-readable error message.
    pub message: String,
}

impl ReportError {
    /// Creates a new report error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code().to_string(),
            backend_code: None,
            message: message.into(),
        }
    }

    /// Converts a backend error to a report error.
    pub fn from_backend<E: BackendError>(err: &E) -> Self {
        Self {
            code: err.error_code().code().to_string(),
            backend_code: Some(err.code().to_string()),
            message: err.message(),
        }
    }
}

/// Report entry for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectReport {
    /// Object name.
    pub object: String,
    /// Outcome.
    pub status: ObjectStatus,
    /// Why the object was skipped or cancelled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportError>,
}

/// Report for a batch operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// True when no object was skipped or cancelled.
    pub ok: bool,
    /// One entry per processed object, in processing order.
    pub entries: Vec<ObjectReport>,
}

impl BatchReport {
    /// Creates an empty (successful) report.
    pub fn new() -> Self {
        Self {
            ok: true,
            entries: Vec::new(),
        }
    }

    /// Records a finished object.
    pub fn finished(&mut self, object: impl Into<String>) {
        self.entries.push(ObjectReport {
            object: object.into(),
            status: ObjectStatus::Finished,
            error: None,
        });
    }

    /// Records a failed object. Degenerate-geometry codes are recorded as
    /// skipped, everything else as cancelled.
    pub fn failed(&mut self, object: impl Into<String>, error: ReportError) {
        let status = if error_is_degenerate(&error.code) {
            ObjectStatus::Skipped
        } else {
            ObjectStatus::Cancelled
        };
        self.ok = false;
        self.entries.push(ObjectReport {
            object: object.into(),
            status,
            error: Some(error),
        });
    }

    /// Records a failed object from a backend error.
    pub fn failed_with<E: BackendError>(&mut self, object: impl Into<String>, err: &E) {
        self.failed(object, ReportError::from_backend(err));
    }

    /// Number of finished objects.
    pub fn finished_count(&self) -> usize {
        self.count(ObjectStatus::Finished)
    }

    /// Number of entries with the given status.
    pub fn count(&self, status: ObjectStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    /// Finds the entry for an object.
    pub fn entry(&self, object: &str) -> Option<&ObjectReport> {
        self.entries.iter().find(|e| e.object == object)
    }
}

fn error_is_degenerate(code: &str) -> bool {
    [
        ErrorCode::EmptyContour,
        ErrorCode::DegeneratePolygon,
        ErrorCode::FaceConstructionFailed,
    ]
    .iter()
    .any(|c| c.code() == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_ok() {
        let report = BatchReport::new();
        assert!(report.ok);
        assert!(report.entries.is_empty());
    }

    #[test]
    fn test_status_from_code() {
        let mut report = BatchReport::new();
        report.finished("a");
        report.failed("b", ReportError::new(ErrorCode::DegeneratePolygon, "2 points"));
        report.failed("c", ReportError::new(ErrorCode::PackedImage, "packed"));

        assert!(!report.ok);
        assert_eq!(report.finished_count(), 1);
        assert_eq!(report.entry("b").unwrap().status, ObjectStatus::Skipped);
        assert_eq!(report.entry("c").unwrap().status, ObjectStatus::Cancelled);
    }

    #[test]
    fn test_report_json_shape() {
        let mut report = BatchReport::new();
        report.failed("b", ReportError::new(ErrorCode::EmptyContour, "empty"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"][0]["status"], "skipped");
        assert_eq!(json["entries"][0]["error"]["code"], "E010");
        assert!(json["entries"][0]["error"].get("backend_code").is_none());
    }
}
