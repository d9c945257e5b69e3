//! Sprite import.
//!
//! Importing a PNG creates a textured quad in the sprite plane. The quad
//! hangs down from the object origin: its top-left corner sits at the
//! origin and it spans `W·s` along +X and `H·s` along -Z.

use std::path::{Path, PathBuf};

use bonedot_spec::config::DEFAULT_SCALE;
use bonedot_spec::scene::{
    ImageData, ImageNode, Interpolation, LoopUv, Material, MeshData, ObjectKind, SceneDocument,
    SceneObject, SpriteContext, Transform, VertexGroupWeight,
};
use bonedot_spec::BatchReport;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{SilhouetteError, SilhouetteResult};
use crate::image::png_dimensions;

/// Locked vertex group holding the four base quad vertices.
pub const BASE_SPRITE_GROUP: &str = "bonedot_base_sprite";

/// Name of the UV layer created on import.
pub const UV_LAYER_NAME: &str = "UVMap";

/// Placement of an imported sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteImportOptions {
    /// Units per pixel.
    pub scale: f64,
    /// Position in pixels; `z` is flipped on import.
    pub position: [f64; 3],
    /// Extra offset in pixels.
    pub offset: [f64; 3],
    /// Parent object name.
    pub parent: Option<String>,
}

impl Default for SpriteImportOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            position: [0.0; 3],
            offset: [0.0; 3],
            parent: None,
        }
    }
}

impl SpriteImportOptions {
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Object location: `(pos.x, pos.y, -pos.z)·s + offset·s`.
    pub fn location(&self) -> [f64; 3] {
        let s = self.scale;
        let [px, py, pz] = self.position;
        let [ox, oy, oz] = self.offset;
        [px * s + ox * s, py * s + oy * s, -pz * s + oz * s]
    }
}

/// The base quad for a `width`×`height` image.
pub fn sprite_quad(width: u32, height: u32, scale: f64) -> MeshData {
    let (w, h) = (width as f64 * scale, height as f64 * scale);
    MeshData {
        vertices: vec![[0.0, 0.0, -h], [w, 0.0, -h], [w, 0.0, 0.0], [0.0, 0.0, 0.0]],
        polygons: vec![vec![0, 1, 2, 3]],
        uv_layer: Some(LoopUv {
            name: UV_LAYER_NAME.to_string(),
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        }),
        vertex_groups: vec![BASE_SPRITE_GROUP.to_string()],
        locked_groups: vec![BASE_SPRITE_GROUP.to_string()],
        weights: vec![vec![VertexGroupWeight { group: 0, weight: 1.0 }]; 4],
    }
}

/// Imports the PNG at `path` as a sprite quad and returns the object name.
///
/// An image already pointing at `path` is reused. New objects, materials
/// and images that collide with existing names get a `.001`-style suffix.
pub fn import_sprite(
    scene: &mut SceneDocument,
    path: &Path,
    options: &SpriteImportOptions,
) -> SilhouetteResult<String> {
    let (width, height) = png_dimensions(path)?;
    if let Some(parent) = &options.parent {
        if scene.object(parent).is_none() {
            return Err(SilhouetteError::UnknownObject {
                name: parent.clone(),
            });
        }
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Sprite".to_string());
    let filepath = path.to_string_lossy().into_owned();

    let image_name = match scene
        .images
        .iter()
        .find(|img| img.filepath.as_deref() == Some(filepath.as_str()))
    {
        Some(existing) => existing.name.clone(),
        None => {
            let name = unique_name(&file_name, |n| scene.image(n).is_some());
            scene.images.push(ImageData {
                name: name.clone(),
                filepath: Some(filepath),
                packed: false,
                size: [width, height],
            });
            name
        }
    };

    let material_name = unique_name(&image_name, |n| scene.material(n).is_some());
    scene.materials.push(Material {
        name: material_name.clone(),
        use_nodes: true,
        image_nodes: vec![ImageNode {
            image: Some(image_name.clone()),
            interpolation: Interpolation::Closest,
        }],
    });

    let object_name = unique_name(&image_name, |n| scene.object(n).is_some());
    let mut object = SceneObject::new(object_name.clone(), ObjectKind::Mesh)
        .with_transform(Transform::at(options.location()));
    object.parent = options.parent.clone();
    object.sprite = true;
    object.material_slots = vec![material_name];
    object.mesh = Some(sprite_quad(width, height, options.scale));
    scene.objects.push(object);

    debug!(object = %object_name, width, height, scale = options.scale, "Imported sprite");
    Ok(object_name)
}

/// PNG files directly inside `dir`, sorted by name.
pub fn sprite_files(dir: &Path) -> SilhouetteResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SilhouetteError::ImageNotFound {
            path: dir.to_path_buf(),
        });
    }
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            let is_png = e
                .path()
                .extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("png"));
            is_png && e.file_type().is_file()
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    Ok(files)
}

/// Imports several sprites under the sprite object owning `active`.
///
/// Files whose name is already an object name are skipped without an entry.
pub fn import_sprites(
    scene: &mut SceneDocument,
    paths: &[PathBuf],
    context: &mut SpriteContext,
    active: Option<&str>,
    scale: f64,
) -> BatchReport {
    let parent = context.resolve(scene, active);
    let mut options = SpriteImportOptions::default().with_scale(scale);
    options.parent = parent;

    let mut report = BatchReport::new();
    for path in paths {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if scene.object(&file_name).is_some() {
            debug!(object = %file_name, "Sprite already imported");
            continue;
        }
        match import_sprite(scene, path, &options) {
            Ok(name) => report.finished(name),
            Err(err) => report.failed_with(file_name, &err),
        }
    }

    info!(
        imported = report.finished_count(),
        parent = ?options.parent,
        "Sprite import complete"
    );
    report
}

/// `base`, or `base.001`, `base.002`, ... for the first unused name.
fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{}.{:03}", base, i))
        .find(|name| !taken(name))
        .unwrap_or_else(|| base.to_string())
}
