//! `.bdsket` export document types.
//!
//! A `.bdsket` file is a JSON document consumed by the game-engine import step.
//! It contains one record per exported armature:
//!
//! ```json
//! {
//!   "format": "bdsket",
//!   "version": 1,
//!   "armatures": [{
//!     "name": "Armature",
//!     "textures": [{"texture": "textures/body.png", "size": [256, 512]}],
//!     "meshes": [...],
//!     "bones": [{"name": "root", "parent": null, "head": [0.0, 0.0], "tail": [0.0, 1.0], "angle": 1.570796}],
//!     "animations": [{"name": "walk", "data": {"fps": 24, "tracks": [...]}}]
//!   }]
//! }
//! ```
//!
//! Location keys serialize as `[frame, x, y]` and rotation keys as
//! `[frame, angle]`. All floats are rounded to six decimal digits by the
//! producers before they land in these types.

mod validation;


use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

pub use validation::validate_document;

/// File extension of export documents.
pub const BDSKET_EXTENSION: &str = "bdsket";
/// Value of the `format` field.
pub const BDSKET_FORMAT: &str = "bdsket";
/// Current document version.
pub const BDSKET_VERSION: u32 = 1;

/// A complete export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Always `"bdsket"`.
    pub format: String,
    /// Document schema version.
    pub version: u32,
    /// One record per exported armature.
    pub armatures: Vec<ArmatureExport>,
}

impl Default for ExportDocument {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ExportDocument {
    /// Creates a document for the given armature records.
    pub fn new(armatures: Vec<ArmatureExport>) -> Self {
        Self {
            format: BDSKET_FORMAT.to_string(),
            version: BDSKET_VERSION,
            armatures,
        }
    }

    /// Serializes the document to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String, SpecError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Parses a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the document to `path` and returns the BLAKE3 hash of the bytes written.
    pub fn write(&self, path: &Path, pretty: bool) -> Result<String, SpecError> {
        let json = self.to_json(pretty)?;
        std::fs::write(path, json.as_bytes())?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    /// Reads a document from `path`.
    pub fn read(path: &Path) -> Result<Self, SpecError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Finds an armature record by name.
    pub fn armature(&self, name: &str) -> Option<&ArmatureExport> {
        self.armatures.iter().find(|a| a.name == name)
    }
}

/// Everything exported for one armature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmatureExport {
    /// Armature object name.
    pub name: String,
    /// Textures used by the armature's child meshes.
    pub textures: Vec<TextureRef>,
    /// Child mesh geometry.
    pub meshes: Vec<MeshExport>,
    /// Flat bone list.
    pub bones: Vec<BoneRecord>,
    /// Sampled animations.
    pub animations: Vec<AnimationExport>,
}

impl ArmatureExport {
    /// Finds a bone record by name.
    pub fn bone(&self, name: &str) -> Option<&BoneRecord> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// Finds an animation by action name.
    pub fn animation(&self, name: &str) -> Option<&AnimationExport> {
        self.animations.iter().find(|a| a.name == name)
    }
}

/// Texture reference relative to the export directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureRef {
    /// Relative path, e.g. `textures/body.png`.
    pub texture: String,
    /// Pixel size `[width, height]`.
    pub size: [u32; 2],
}

/// Geometry of one sprite mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshExport {
    /// Object name up to the first `.`.
    pub name: String,
    /// World-space 2D vertex positions.
    pub vertices: Vec<[f64; 2]>,
    /// One UV per vertex.
    pub uvs: Vec<[f64; 2]>,
    /// Triangle vertex indices.
    pub triangles: Vec<[u32; 3]>,
    /// Texture this mesh samples.
    pub texture: String,
    /// World Z of the object origin, used for draw ordering.
    pub z_hint: f64,
    /// Per-vertex bone weights keyed by bone name.
    pub weights: Vec<BTreeMap<String, f64>>,
}

/// Bone in the armature's flat bone list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneRecord {
    /// Bone name, unique within the armature.
    pub name: String,
    /// Parent bone name (`null` for roots).
    pub parent: Option<String>,
    /// World-space head.
    pub head: [f64; 2],
    /// World-space tail.
    pub tail: [f64; 2],
    /// In-plane angle of tail - head, radians.
    pub angle: f64,
}

/// A named, sampled action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationExport {
    /// Action name.
    pub name: String,
    /// Sampled tracks.
    pub data: BakedAnimation,
}

/// Sampled tracks for every pose bone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BakedAnimation {
    /// Number of sampled frames (`frame_end - frame_start + 1`).
    ///
    /// The name is kept for compatibility with existing importers; the value
    /// is a frame count, not a playback rate.
    pub fps: u32,
    /// One track per pose bone.
    pub tracks: Vec<BoneTrack>,
}

impl BakedAnimation {
    /// Finds the track for a bone.
    pub fn track(&self, bone: &str) -> Option<&BoneTrack> {
        self.tracks.iter().find(|t| t.bone == bone)
    }
}

/// Location and rotation keys of one bone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneTrack {
    /// Bone name.
    pub bone: String,
    /// Location keys.
    pub location: Vec<LocationKey>,
    /// Rotation keys.
    pub rotation: Vec<RotationKey>,
}

/// Location sample, serialized as `[frame, x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i32, f64, f64)", into = "(i32, f64, f64)")]
pub struct LocationKey {
    pub frame: i32,
    pub x: f64,
    pub y: f64,
}

impl LocationKey {
    pub fn new(frame: i32, x: f64, y: f64) -> Self {
        Self { frame, x, y }
    }
}

impl From<(i32, f64, f64)> for LocationKey {
    fn from((frame, x, y): (i32, f64, f64)) -> Self {
        Self { frame, x, y }
    }
}

impl From<LocationKey> for (i32, f64, f64) {
    fn from(key: LocationKey) -> Self {
        (key.frame, key.x, key.y)
    }
}

/// Rotation sample, serialized as `[frame, angle]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i32, f64)", into = "(i32, f64)")]
pub struct RotationKey {
    pub frame: i32,
    pub angle: f64,
}

impl RotationKey {
    pub fn new(frame: i32, angle: f64) -> Self {
        Self { frame, angle }
    }
}

impl From<(i32, f64)> for RotationKey {
    fn from((frame, angle): (i32, f64)) -> Self {
        Self { frame, angle }
    }
}

impl From<RotationKey> for (i32, f64) {
    fn from(key: RotationKey) -> Self {
        (key.frame, key.angle)
    }
}
