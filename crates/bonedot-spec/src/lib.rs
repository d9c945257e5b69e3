//! BoneDot shared types
//!
//! This crate holds the data model shared by the BoneDot backends and CLI:
//!
//! - [`export`]: the `.bdsket` export document (textures, meshes, bones,
//!   animations) and its structural validation
//! - [`scene`]: scene documents, the JSON snapshot of host data the backends
//!   read and edit, plus sprite-object lookup
//! - [`config`]: cut and export settings
//! - [`report`]: per-object batch reports
//! - [`error`]: error codes, validation errors and the [`BackendError`] trait
//! - [`precision`]: fixed six-digit rounding for serialized floats
//!
//! # Example
//!
//! ```
//! use bonedot_spec::export::{ExportDocument, validate_document};
//!
//! let doc = ExportDocument::new(Vec::new());
//! assert!(validate_document(&doc).is_empty());
//! assert!(doc.to_json(false).unwrap().contains("\"format\":\"bdsket\""));
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod precision;
pub mod report;
pub mod scene;

// Re-export commonly used types at the crate root
pub use config::{BonedotConfig, CutConfig, ExportConfig};
pub use error::{BackendError, ErrorCode, SpecError, ValidationError};
pub use export::{
    AnimationExport, ArmatureExport, BakedAnimation, BoneRecord, BoneTrack, ExportDocument,
    LocationKey, MeshExport, RotationKey, TextureRef,
};
pub use precision::{round6, round_point};
pub use report::{BatchReport, ObjectReport, ObjectStatus, ReportError};
pub use scene::{SceneDocument, SceneObject, SpriteContext};
