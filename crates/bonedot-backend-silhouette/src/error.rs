//! Error types for the silhouette backend.

use std::path::PathBuf;

use bonedot_spec::{BackendError, ErrorCode};
use thiserror::Error;

/// Result type for silhouette backend operations.
pub type SilhouetteResult<T> = Result<T, SilhouetteError>;

/// Errors that can occur while cutting sprites or editing sprite meshes.
#[derive(Debug, Error)]
pub enum SilhouetteError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG data could not be decoded.
    #[error("Failed to decode PNG: {message}")]
    Decode { message: String },

    /// PNG data could not be encoded.
    #[error("Failed to encode PNG: {message}")]
    Encode { message: String },

    /// Pixel buffer length does not match the image size.
    #[error("Pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Object has the wrong type.
    #[error("Object '{object}' is a {kind}, expected a mesh")]
    WrongObjectType { object: String, kind: String },

    /// Target mesh is not a single-quad plane.
    #[error("Object '{object}' is not a plane ({vertices} vertices, {polygons} polygons)")]
    NotAPlane {
        object: String,
        vertices: usize,
        polygons: usize,
    },

    /// Object has no node material.
    #[error("Object '{object}' has no node-based material")]
    MissingMaterialNodes { object: String },

    /// Material has no image texture node with an image.
    #[error("Object '{object}' has no image texture node")]
    MissingImageNode { object: String },

    /// Image is packed into the scene.
    #[error("Image '{image}' is packed and cannot be loaded from disk")]
    PackedImage { image: String },

    /// Image file is missing.
    #[error("Image file not found: {path}")]
    ImageNotFound { path: PathBuf },

    /// Object does not exist.
    #[error("Unknown object '{name}'")]
    UnknownObject { name: String },

    /// The mask has no opaque boundary.
    #[error("Traced contour is empty")]
    EmptyContour,

    /// Too few points survived simplification to build a face.
    #[error("Cutter polygon has {points} point(s), at least 3 are required")]
    DegeneratePolygon { points: usize },

    /// The cutter face could not be built.
    #[error("Cutter face construction failed: {reason}")]
    FaceConstructionFailed { reason: String },

    /// The host failed to apply the knife cut.
    #[error("Cut failed on '{object}': {message}")]
    CutFailed { object: String, message: String },

    /// Mesh has no UV layer or no image size to sync against.
    #[error("Cannot sync UVs on '{object}': {message}")]
    MissingUvSource { object: String, message: String },
}

impl SilhouetteError {
    /// Creates a new decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a new face construction error.
    pub fn face_failed(reason: impl Into<String>) -> Self {
        Self::FaceConstructionFailed {
            reason: reason.into(),
        }
    }

    /// Creates a new cut failure.
    pub fn cut_failed(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CutFailed {
            object: object.into(),
            message: message.into(),
        }
    }

    /// True for degenerate-geometry errors (object skipped, not cancelled).
    pub fn is_degenerate(&self) -> bool {
        self.error_code().is_degenerate()
    }
}

impl BackendError for SilhouetteError {
    fn code(&self) -> &'static str {
        match self {
            SilhouetteError::Io(_) => "SILHOUETTE_001",
            SilhouetteError::Decode { .. } => "SILHOUETTE_002",
            SilhouetteError::Encode { .. } => "SILHOUETTE_003",
            SilhouetteError::SizeMismatch { .. } => "SILHOUETTE_004",
            SilhouetteError::WrongObjectType { .. } => "SILHOUETTE_005",
            SilhouetteError::NotAPlane { .. } => "SILHOUETTE_006",
            SilhouetteError::MissingMaterialNodes { .. } => "SILHOUETTE_007",
            SilhouetteError::MissingImageNode { .. } => "SILHOUETTE_008",
            SilhouetteError::PackedImage { .. } => "SILHOUETTE_009",
            SilhouetteError::ImageNotFound { .. } => "SILHOUETTE_010",
            SilhouetteError::UnknownObject { .. } => "SILHOUETTE_011",
            SilhouetteError::EmptyContour => "SILHOUETTE_012",
            SilhouetteError::DegeneratePolygon { .. } => "SILHOUETTE_013",
            SilhouetteError::FaceConstructionFailed { .. } => "SILHOUETTE_014",
            SilhouetteError::CutFailed { .. } => "SILHOUETTE_015",
            SilhouetteError::MissingUvSource { .. } => "SILHOUETTE_016",
        }
    }

    fn category(&self) -> &'static str {
        "silhouette"
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            SilhouetteError::Io(_)
            | SilhouetteError::Decode { .. }
            | SilhouetteError::ImageNotFound { .. } => ErrorCode::ImageNotFound,
            SilhouetteError::Encode { .. } | SilhouetteError::SizeMismatch { .. } => {
                ErrorCode::UnsupportedFormat
            }
            SilhouetteError::WrongObjectType { .. } => ErrorCode::WrongObjectType,
            SilhouetteError::NotAPlane { .. } => ErrorCode::NotAPlane,
            SilhouetteError::MissingMaterialNodes { .. } => ErrorCode::MissingMaterialNodes,
            SilhouetteError::MissingImageNode { .. } => ErrorCode::MissingImageNode,
            SilhouetteError::PackedImage { .. } => ErrorCode::PackedImage,
            SilhouetteError::UnknownObject { .. } => ErrorCode::UnknownObject,
            SilhouetteError::EmptyContour => ErrorCode::EmptyContour,
            SilhouetteError::DegeneratePolygon { .. } => ErrorCode::DegeneratePolygon,
            SilhouetteError::FaceConstructionFailed { .. } => ErrorCode::FaceConstructionFailed,
            SilhouetteError::CutFailed { .. } => ErrorCode::CutFailed,
            SilhouetteError::MissingUvSource { .. } => ErrorCode::MissingUvSource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SilhouetteError::DegeneratePolygon { points: 1 };
        assert!(err.to_string().contains("1 point(s)"));

        let err = SilhouetteError::NotAPlane {
            object: "Cube".to_string(),
            vertices: 8,
            polygons: 6,
        };
        assert!(err.to_string().contains("8 vertices, 6 polygons"));
    }

    #[test]
    fn test_degenerate_errors() {
        assert!(SilhouetteError::EmptyContour.is_degenerate());
        assert!(SilhouetteError::face_failed("zero area").is_degenerate());
        assert!(!SilhouetteError::cut_failed("a", "boom").is_degenerate());
        assert!(!SilhouetteError::PackedImage {
            image: "x".to_string()
        }
        .is_degenerate());
    }

    #[test]
    fn test_codes() {
        assert_eq!(SilhouetteError::EmptyContour.code(), "SILHOUETTE_012");
        assert_eq!(
            SilhouetteError::EmptyContour.error_code(),
            ErrorCode::EmptyContour
        );
        assert_eq!(SilhouetteError::EmptyContour.category(), "silhouette");
    }
}
