//! Error types for export validation and batch reporting.

use thiserror::Error;

/// Stable error codes shared by validation and batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input validation errors (E001-E009)
    /// E001: Object has the wrong type for the operation
    WrongObjectType,
    /// E002: Target mesh is not a single-quad plane
    NotAPlane,
    /// E003: Object has no node-based material
    MissingMaterialNodes,
    /// E004: Material has no image texture node
    MissingImageNode,
    /// E005: Image is packed into the scene and has no file path
    PackedImage,
    /// E006: Image file does not exist or cannot be read
    ImageNotFound,
    /// E007: Object referenced by name does not exist
    UnknownObject,
    /// E008: Nothing selected
    EmptySelection,

    // Degenerate geometry errors (E010-E013)
    /// E010: Traced contour is empty
    EmptyContour,
    /// E011: Simplified polygon has fewer than three points
    DegeneratePolygon,
    /// E012: Cutter face could not be constructed
    FaceConstructionFailed,
    /// E013: Host failed to apply the cut
    CutFailed,

    // Animation errors (E020-E022)
    /// E020: Frame range is empty or inverted
    InvalidFrameRange,
    /// E021: Host failed to bake or evaluate an action
    AnimationHostFailed,
    /// E022: Mesh has no UV layer or texture to sync from
    MissingUvSource,

    // Export document errors (E030-E035)
    /// E030: Duplicate bone name within an armature
    DuplicateBoneName,
    /// E031: Bone parent does not name a bone of the same armature
    UnknownParentBone,
    /// E032: Track frames are not strictly increasing
    NonIncreasingTrack,
    /// E033: Triangle index is out of range
    TriangleIndexOutOfRange,
    /// E034: Per-vertex array length does not match the vertex count
    VertexArrayMismatch,
    /// E035: Unsupported document format or version
    UnsupportedFormat,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::WrongObjectType => "E001",
            ErrorCode::NotAPlane => "E002",
            ErrorCode::MissingMaterialNodes => "E003",
            ErrorCode::MissingImageNode => "E004",
            ErrorCode::PackedImage => "E005",
            ErrorCode::ImageNotFound => "E006",
            ErrorCode::UnknownObject => "E007",
            ErrorCode::EmptySelection => "E008",
            ErrorCode::EmptyContour => "E010",
            ErrorCode::DegeneratePolygon => "E011",
            ErrorCode::FaceConstructionFailed => "E012",
            ErrorCode::CutFailed => "E013",
            ErrorCode::InvalidFrameRange => "E020",
            ErrorCode::AnimationHostFailed => "E021",
            ErrorCode::MissingUvSource => "E022",
            ErrorCode::DuplicateBoneName => "E030",
            ErrorCode::UnknownParentBone => "E031",
            ErrorCode::NonIncreasingTrack => "E032",
            ErrorCode::TriangleIndexOutOfRange => "E033",
            ErrorCode::VertexArrayMismatch => "E034",
            ErrorCode::UnsupportedFormat => "E035",
        }
    }

    /// Returns true for degenerate-geometry failures, which skip the object
    /// without touching the target.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            ErrorCode::EmptyContour
                | ErrorCode::DegeneratePolygon
                | ErrorCode::FaceConstructionFailed
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and optional JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// JSON path to the problematic field (e.g., "armatures\[0\].bones\[2\].parent").
    pub path: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation error with a JSON path.
    pub fn with_path(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Top-level error type for document operations.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Document validation failed with one or more errors.
    #[error("document validation failed with {0} error(s)")]
    ValidationFailed(usize),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be loaded.
    #[error("failed to load config from {path}: {message}")]
    Config { path: String, message: String },
}

/// Common trait for backend errors.
///
/// Each backend error type implements this trait so that batch reports can
/// carry a stable code alongside the human-readable message.
///
/// # Example
///
/// ```ignore
/// use bonedot_spec::error::BackendError;
///
/// fn handle_error<E: BackendError>(err: E) {
///     eprintln!("[{}] {}", err.code(), err.message());
/// }
/// ```
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting (e.g. "SILHOUETTE_003").
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category for grouping related errors.
    fn category(&self) -> &'static str;

    /// The shared error code this backend error maps to in reports.
    fn error_code(&self) -> ErrorCode;
}
