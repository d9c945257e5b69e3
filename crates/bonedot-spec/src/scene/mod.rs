//! Scene documents.
//!
//! A scene document is a JSON snapshot of the host data the BoneDot pipelines
//! read: objects and their parenting, transforms, sprite meshes, materials with
//! image texture nodes, armatures and actions. The backends run against it
//! through their host traits, so exports and sprite edits can be produced and
//! tested without the host application.

mod context;
mod mesh;
mod transform;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

pub use context::SpriteContext;
pub use mesh::{LoopUv, MeshData, VertexGroupWeight};

/// A snapshot of host scene data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDocument {
    /// The frame the host is currently evaluated at.
    #[serde(default)]
    pub frame_current: i32,
    /// All objects, in host order.
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    /// Materials referenced by object material slots.
    #[serde(default)]
    pub materials: Vec<Material>,
    /// Images referenced by image texture nodes.
    #[serde(default)]
    pub images: Vec<ImageData>,
    /// Actions available in the file.
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl SceneDocument {
    /// Parses a scene document from JSON.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a scene document from disk.
    pub fn read(path: &Path) -> Result<Self, SpecError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Writes the scene document as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<(), SpecError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn image(&self, name: &str) -> Option<&ImageData> {
        self.images.iter().find(|i| i.name == name)
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Direct children of `parent`, in host order.
    pub fn children<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a SceneObject> + 'a {
        self.objects
            .iter()
            .filter(move |o| o.parent.as_deref() == Some(parent))
    }

    /// Images of every image texture node in the object's material slots.
    ///
    /// Slots naming a missing material, materials without nodes and nodes
    /// without an image are skipped.
    pub fn object_images<'a>(&'a self, object: &'a SceneObject) -> Vec<&'a ImageData> {
        object
            .material_slots
            .iter()
            .filter_map(|slot| self.material(slot))
            .filter(|mat| mat.use_nodes)
            .flat_map(|mat| mat.image_nodes.iter())
            .filter_map(|node| node.image.as_deref())
            .filter_map(|name| self.image(name))
            .collect()
    }
}

/// Kind of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Mesh,
    Armature,
    Empty,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Mesh => "mesh",
            ObjectKind::Armature => "armature",
            ObjectKind::Empty => "empty",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local transform of an object relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Transform {
    /// Translation [X, Y, Z].
    pub location: [f64; 3],
    /// XYZ Euler rotation in radians.
    pub rotation: [f64; 3],
    /// Scale [X, Y, Z].
    pub scale: [f64; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl Transform {
    /// Identity transform moved to `location`.
    pub fn at(location: [f64; 3]) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }
}

/// A scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneObject {
    /// Unique object name.
    pub name: String,
    /// Object kind.
    pub kind: ObjectKind,
    /// Parent object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Local transform.
    #[serde(default)]
    pub transform: Transform,
    /// Marks the root object of a sprite rig.
    #[serde(default)]
    pub sprite_object: bool,
    /// Marks a sprite quad created by sprite import.
    #[serde(default, skip_serializing_if = "is_false")]
    pub sprite: bool,
    /// Material names, one per slot.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub material_slots: Vec<String>,
    /// Mesh data for mesh objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshData>,
    /// Armature data for armature objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armature: Option<ArmatureData>,
    /// Action currently assigned to the object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl SceneObject {
    /// Creates an object of `kind` with an identity transform and no data.
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            transform: Transform::default(),
            sprite_object: false,
            sprite: false,
            material_slots: Vec::new(),
            mesh: None,
            armature: None,
            action: None,
        }
    }

    /// Sets the parent object.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the local transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// First material slot, which the host treats as the active material.
    pub fn active_material(&self) -> Option<&str> {
        self.material_slots.first().map(String::as_str)
    }
}

/// A material with the image texture nodes of its node tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Material {
    pub name: String,
    /// Whether the material uses a node tree.
    #[serde(default = "default_true")]
    pub use_nodes: bool,
    /// Image texture nodes, in node-tree order.
    #[serde(default)]
    pub image_nodes: Vec<ImageNode>,
}

fn default_true() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Image texture node sampling filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
    Closest,
}

/// An image texture node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageNode {
    /// Name of the image the node samples, if any.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub interpolation: Interpolation,
}

/// An image datablock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageData {
    pub name: String,
    /// Path of the backing file; absent for generated images.
    #[serde(default)]
    pub filepath: Option<String>,
    /// Image data is packed into the scene file.
    #[serde(default)]
    pub packed: bool,
    /// Pixel size [width, height].
    pub size: [u32; 2],
}

/// Rest-pose armature data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArmatureData {
    /// Flat bone list.
    pub bones: Vec<BoneData>,
}

impl ArmatureData {
    pub fn bone(&self, name: &str) -> Option<&BoneData> {
        self.bones.iter().find(|b| b.name == name)
    }
}

/// Rest-pose bone in armature space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoneData {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Head in armature space.
    pub head_local: [f64; 3],
    /// Tail in armature space.
    pub tail_local: [f64; 3],
}

/// An action: keyframed F-curves addressed by data path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Action {
    pub name: String,
    /// First and last frame of the action.
    pub frame_range: [f64; 2],
    #[serde(default)]
    pub fcurves: Vec<FCurve>,
}

/// One animated channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FCurve {
    /// Data path, e.g. `pose.bones["arm"].location`.
    pub data_path: String,
    /// Component index within the property.
    #[serde(default)]
    pub array_index: usize,
    /// `[frame, value]` keyframes sorted by frame.
    pub keyframes: Vec<[f64; 2]>,
}

impl FCurve {
    /// Bone name for `pose.bones["<name>"]...` paths.
    pub fn pose_bone(&self) -> Option<&str> {
        let rest = self.data_path.strip_prefix("pose.bones[\"")?;
        let end = rest.find('"')?;
        Some(&rest[..end])
    }

    /// Property name after the bone selector, e.g. `location`.
    pub fn property(&self) -> Option<&str> {
        let rest = self.data_path.strip_prefix("pose.bones[\"")?;
        let end = rest.find("\"].")?;
        Some(&rest[end + 3..])
    }

    /// Linear interpolation with constant extrapolation.
    pub fn evaluate(&self, frame: f64) -> f64 {
        let keys = &self.keyframes;
        let (first, last) = match (keys.first(), keys.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return 0.0,
        };
        if frame <= first[0] {
            return first[1];
        }
        if frame >= last[0] {
            return last[1];
        }
        for pair in keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if frame >= a[0] && frame <= b[0] {
                let span = b[0] - a[0];
                if span <= 0.0 {
                    return b[1];
                }
                let t = (frame - a[0]) / span;
                return a[1] + (b[1] - a[1]) * t;
            }
        }
        last[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(path: &str, index: usize, keys: &[[f64; 2]]) -> FCurve {
        FCurve {
            data_path: path.to_string(),
            array_index: index,
            keyframes: keys.to_vec(),
        }
    }

    #[test]
    fn test_fcurve_pose_bone_parsing() {
        let c = curve("pose.bones[\"upper_arm\"].rotation_euler", 2, &[]);
        assert_eq!(c.pose_bone(), Some("upper_arm"));
        assert_eq!(c.property(), Some("rotation_euler"));

        let c = curve("location", 0, &[]);
        assert_eq!(c.pose_bone(), None);
        assert_eq!(c.property(), None);
    }

    #[test]
    fn test_fcurve_evaluate() {
        let c = curve("x", 0, &[[1.0, 0.0], [11.0, 10.0]]);
        assert_eq!(c.evaluate(0.0), 0.0);
        assert_eq!(c.evaluate(1.0), 0.0);
        assert_eq!(c.evaluate(6.0), 5.0);
        assert_eq!(c.evaluate(11.0), 10.0);
        assert_eq!(c.evaluate(20.0), 10.0);
        assert_eq!(curve("x", 0, &[]).evaluate(3.0), 0.0);
    }

    #[test]
    fn test_object_images_follow_slots() {
        let mut doc = SceneDocument::default();
        doc.images.push(ImageData {
            name: "body.png".to_string(),
            filepath: Some("/art/body.png".to_string()),
            packed: false,
            size: [32, 64],
        });
        doc.materials.push(Material {
            name: "body".to_string(),
            use_nodes: true,
            image_nodes: vec![
                ImageNode {
                    image: None,
                    interpolation: Interpolation::Closest,
                },
                ImageNode {
                    image: Some("body.png".to_string()),
                    interpolation: Interpolation::Closest,
                },
            ],
        });
        let mut obj = SceneObject::new("body", ObjectKind::Mesh);
        obj.material_slots = vec!["missing".to_string(), "body".to_string()];
        doc.objects.push(obj);

        let obj = doc.object("body").unwrap();
        let images = doc.object_images(obj);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].size, [32, 64]);
    }

    #[test]
    fn test_scene_json_defaults() {
        let doc = SceneDocument::from_json(
            r#"{"objects": [{"name": "Armature", "kind": "armature"}]}"#,
        )
        .unwrap();
        let obj = doc.object("Armature").unwrap();
        assert_eq!(obj.kind, ObjectKind::Armature);
        assert_eq!(obj.transform, Transform::default());
        assert!(!obj.sprite_object);
        assert_eq!(doc.frame_current, 0);
    }

    #[test]
    fn test_children() {
        let mut doc = SceneDocument::default();
        doc.objects.push(SceneObject::new("rig", ObjectKind::Armature));
        doc.objects
            .push(SceneObject::new("a", ObjectKind::Mesh).with_parent("rig"));
        doc.objects.push(SceneObject::new("b", ObjectKind::Mesh));
        let names: Vec<&str> = doc.children("rig").map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }
}
