//! Error types for the rig backend.

use bonedot_spec::{BackendError, ErrorCode};
use thiserror::Error;

/// Result type for rig backend operations.
pub type RigResult<T> = Result<T, RigError>;

/// Errors that can occur while extracting skeletons or sampling animation.
#[derive(Debug, Error)]
pub enum RigError {
    /// Nothing was selected for export.
    #[error("No objects selected, select an armature")]
    EmptySelection,

    /// Object does not exist.
    #[error("Unknown object '{name}'")]
    UnknownObject { name: String },

    /// Object is not an armature.
    #[error("Object '{object}' is a {kind}, expected an armature")]
    NotAnArmature { object: String, kind: String },

    /// Bone does not exist in the armature.
    #[error("Armature '{armature}' has no bone '{bone}'")]
    UnknownBone { armature: String, bone: String },

    /// Action does not exist.
    #[error("Unknown action '{name}'")]
    UnknownAction { name: String },

    /// The sampled frame range is empty.
    #[error("Invalid frame range: end {end} is before start {start}")]
    InvalidFrameRange { start: i32, end: i32 },

    /// The animation host failed.
    #[error("Animation host error: {message}")]
    Host { message: String },
}

impl RigError {
    /// Creates a new host error.
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }

    /// Creates a new unknown object error.
    pub fn unknown_object(name: impl Into<String>) -> Self {
        Self::UnknownObject { name: name.into() }
    }
}

impl BackendError for RigError {
    fn code(&self) -> &'static str {
        match self {
            RigError::EmptySelection => "RIG_001",
            RigError::UnknownObject { .. } => "RIG_002",
            RigError::NotAnArmature { .. } => "RIG_003",
            RigError::UnknownBone { .. } => "RIG_004",
            RigError::UnknownAction { .. } => "RIG_005",
            RigError::InvalidFrameRange { .. } => "RIG_006",
            RigError::Host { .. } => "RIG_007",
        }
    }

    fn category(&self) -> &'static str {
        "rig"
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            RigError::EmptySelection => ErrorCode::EmptySelection,
            RigError::UnknownObject { .. } => ErrorCode::UnknownObject,
            RigError::NotAnArmature { .. } => ErrorCode::WrongObjectType,
            RigError::InvalidFrameRange { .. } => ErrorCode::InvalidFrameRange,
            RigError::UnknownBone { .. }
            | RigError::UnknownAction { .. }
            | RigError::Host { .. } => ErrorCode::AnimationHostFailed,
        }
    }
}
