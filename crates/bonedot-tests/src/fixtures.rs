//! Test fixture utilities for PNG files and scene documents.

use std::f64::consts::FRAC_PI_2;
use std::fs;
use std::path::{Path, PathBuf};

use bonedot_backend_silhouette::image::{encode_png, RasterImage};
use bonedot_backend_silhouette::sprite::{import_sprite, SpriteImportOptions};
use bonedot_spec::scene::{
    Action, ArmatureData, BoneData, FCurve, ImageData, ImageNode, Interpolation, LoopUv, Material,
    MeshData, ObjectKind, SceneDocument, SceneObject, Transform, VertexGroupWeight,
};
use tempfile::TempDir;

/// A temporary directory holding images and scene documents.
pub struct SceneFixture {
    pub root: TempDir,
}

impl Default for SceneFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneFixture {
    /// Create a new empty fixture directory.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        Self { root }
    }

    /// Get the fixture root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write a PNG whose pixels come from `f`.
    pub fn write_png(
        &self,
        name: &str,
        width: u32,
        height: u32,
        f: impl Fn(u32, u32) -> [u8; 4],
    ) -> PathBuf {
        let image = RasterImage::from_fn(width, height, f);
        let bytes = encode_png(&image).expect("Failed to encode PNG");
        let path = self.path().join(name);
        fs::write(&path, bytes).expect("Failed to write PNG");
        path
    }

    /// Write a `size`×`size` transparent PNG with an opaque square of side
    /// `square` centered in it.
    pub fn write_square_png(&self, name: &str, size: u32, square: u32) -> PathBuf {
        let start = (size - square) / 2;
        let end = start + square;
        self.write_png(name, size, size, |x, y| {
            if (start..end).contains(&x) && (start..end).contains(&y) {
                [200, 40, 40, 255]
            } else {
                [0, 0, 0, 0]
            }
        })
    }

    /// Write a scene document and return its path.
    pub fn write_scene(&self, name: &str, scene: &SceneDocument) -> PathBuf {
        let path = self.path().join(name);
        scene.write(&path).expect("Failed to write scene");
        path
    }

    /// A scene with one sprite plane per PNG, named after the file.
    pub fn sprite_scene<P: AsRef<Path>>(&self, pngs: &[P]) -> SceneDocument {
        let mut scene = SceneDocument::default();
        for png in pngs {
            import_sprite(&mut scene, png.as_ref(), &SpriteImportOptions::default())
                .expect("Failed to import sprite");
        }
        scene
    }
}

fn bone(name: &str, parent: Option<&str>, head: [f64; 3], tail: [f64; 3]) -> BoneData {
    BoneData {
        name: name.to_string(),
        parent: parent.map(str::to_string),
        head_local: head,
        tail_local: tail,
    }
}

/// A two-bone chain `A → B` pointing along +Y, a skinned child mesh and two
/// actions: `wave` turns `B` a quarter turn over frames 1..=5, `hold`
/// keys `A` without moving it.
pub fn chain_rig_scene() -> SceneDocument {
    let mut rig = SceneObject::new("rig", ObjectKind::Armature);
    rig.sprite_object = true;
    rig.armature = Some(ArmatureData {
        bones: vec![
            bone("A", None, [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            bone("B", Some("A"), [0.0, 1.0, 0.0], [0.0, 2.0, 0.0]),
        ],
    });

    let mut body = SceneObject::new("body.001", ObjectKind::Mesh)
        .with_parent("rig")
        .with_transform(Transform::at([0.0, 0.0, 0.25]));
    body.material_slots = vec!["body".to_string()];
    body.mesh = Some(MeshData {
        vertices: vec![
            [-0.5, 0.0, 0.0],
            [0.5, 0.0, 0.0],
            [0.5, 2.0, 0.0],
            [-0.5, 2.0, 0.0],
        ],
        polygons: vec![vec![0, 1, 2, 3]],
        uv_layer: Some(LoopUv {
            name: "UVMap".to_string(),
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        }),
        vertex_groups: vec!["A".to_string(), "B".to_string()],
        locked_groups: Vec::new(),
        weights: vec![
            vec![VertexGroupWeight { group: 0, weight: 1.0 }],
            vec![VertexGroupWeight { group: 0, weight: 1.0 }],
            vec![VertexGroupWeight { group: 1, weight: 1.0 }],
            vec![VertexGroupWeight { group: 1, weight: 1.0 }],
        ],
    });

    SceneDocument {
        frame_current: 1,
        objects: vec![rig, body, SceneObject::new("lamp", ObjectKind::Empty)],
        materials: vec![Material {
            name: "body".to_string(),
            use_nodes: true,
            image_nodes: vec![ImageNode {
                image: Some("body".to_string()),
                interpolation: Interpolation::Closest,
            }],
        }],
        images: vec![ImageData {
            name: "body".to_string(),
            filepath: Some("//sprites/body.png".to_string()),
            packed: false,
            size: [50, 200],
        }],
        actions: vec![
            Action {
                name: "wave".to_string(),
                frame_range: [1.0, 5.0],
                fcurves: vec![FCurve {
                    data_path: "pose.bones[\"B\"].rotation_euler".to_string(),
                    array_index: 2,
                    keyframes: vec![[1.0, 0.0], [5.0, FRAC_PI_2]],
                }],
            },
            Action {
                name: "hold".to_string(),
                frame_range: [0.0, 3.0],
                fcurves: vec![FCurve {
                    data_path: "pose.bones[\"A\"].location".to_string(),
                    array_index: 0,
                    keyframes: vec![[0.0, 0.0], [3.0, 0.0]],
                }],
            },
            Action {
                name: "door_open".to_string(),
                frame_range: [0.0, 10.0],
                fcurves: vec![FCurve {
                    data_path: "location".to_string(),
                    array_index: 0,
                    keyframes: vec![[0.0, 0.0], [10.0, 1.0]],
                }],
            },
        ],
    }
}
