//! BoneDot rig backend
//!
//! Turns armatures into `.bdsket` export records:
//!
//! - [`skeleton`]: rest bones flattened to 2D head/tail/angle records
//! - [`pose`]: baked pose sampling with run-length key compression
//! - [`mesh_export`]: child mesh geometry, UVs, weights and texture paths
//! - [`export`]: per-selection assembly into an [`ExportDocument`]
//!
//! The host is reached through two traits. [`RigScene`] gives read access to
//! objects, world matrices, images and actions; [`AnimationHost`] drives the
//! current frame, active action, baking and pose evaluation. Sampling wraps
//! the host in a [`FrameGuard`], which puts the frame and active action back
//! on every exit path.
//!
//! [`DocumentHost`] implements both traits on a [`SceneDocument`].
//!
//! # Example
//!
//! ```
//! use bonedot_backend_rig::{DocumentHost, Exporter};
//! use bonedot_spec::scene::{ArmatureData, BoneData, ObjectKind, SceneDocument, SceneObject};
//!
//! let mut rig = SceneObject::new("rig", ObjectKind::Armature);
//! rig.armature = Some(ArmatureData {
//!     bones: vec![BoneData {
//!         name: "root".to_string(),
//!         parent: None,
//!         head_local: [0.0, 0.0, 0.0],
//!         tail_local: [0.0, 1.0, 0.0],
//!     }],
//! });
//! let mut host = DocumentHost::new(SceneDocument {
//!     objects: vec![rig],
//!     ..Default::default()
//! });
//!
//! let (doc, report) = Exporter::default().export(&mut host, &["rig"]).unwrap();
//! assert!(report.ok);
//! assert_eq!(doc.armatures[0].bones[0].angle, 1.570796);
//! ```
//!
//! [`ExportDocument`]: bonedot_spec::ExportDocument
//! [`SceneDocument`]: bonedot_spec::SceneDocument

pub mod document;
pub mod error;
pub mod export;
pub mod guard;
pub mod host;
pub mod mesh_export;
pub mod pose;
pub mod posing;
pub mod skeleton;

pub use document::DocumentHost;
pub use error::{RigError, RigResult};
pub use export::{action_affects_armature, Exporter};
pub use guard::FrameGuard;
pub use host::{baked_action_name, AnimationHost, RigScene, BAKED_SUFFIX};
pub use mesh_export::{export_mesh, texture_refs};
pub use pose::{PoseSampler, TrackBuilder};
pub use skeleton::{armature_skeleton, extract_skeleton};
