//! Silhouette cut pipeline.
//!
//! For every target object the pipeline validates the sprite plane, traces
//! the alpha silhouette of its image, builds a cutter mesh and asks the host
//! to knife-project it. Each object gets a report entry; one failing object
//! never stops the batch.

use std::path::{Path, PathBuf};

use bonedot_spec::scene::{ObjectKind, SceneDocument};
use bonedot_spec::{BackendError, BatchReport, CutConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::contour::trace;
use crate::cutter::{build_cutter_mesh, CutterMesh, CutterPolygon};
use crate::error::{SilhouetteError, SilhouetteResult};
use crate::image::{load_png, RasterImage};
use crate::mapping::PixelMapper;
use crate::mask::build_mask;
use crate::simplify::simplify;

/// Everything the pipeline needs to know about a cut target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub name: String,
    pub kind: ObjectKind,
    pub vertex_count: usize,
    pub polygon_count: usize,
    /// World location of the object origin.
    pub location: [f64; 3],
    /// Active material, if the object has one.
    pub material: Option<MaterialInfo>,
}

/// Active material of a cut target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialInfo {
    pub name: String,
    pub use_nodes: bool,
    /// Image of the first image texture node that has one.
    pub image: Option<ImageInfo>,
}

/// Image sampled by the target's material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub name: String,
    /// Absolute path of the backing file.
    pub filepath: Option<PathBuf>,
    pub packed: bool,
}

/// Host operations needed to apply a cut.
pub trait CutHost {
    /// Handle to a cutter object linked into the host scene.
    type Cutter;

    /// Describes the object called `object`.
    fn inspect(&self, object: &str) -> SilhouetteResult<TargetInfo>;

    /// Links `mesh` into the scene as a new object at `location`.
    fn link_cutter(&mut self, mesh: &CutterMesh, location: [f64; 3]) -> SilhouetteResult<Self::Cutter>;

    /// Projects the cutter outline onto `target`, splitting its faces.
    fn knife_project(&mut self, target: &str, cutter: &Self::Cutter) -> SilhouetteResult<()>;

    /// Deletes a linked cutter. Called after every link, whether or not the
    /// cut succeeded.
    fn remove_cutter(&mut self, cutter: Self::Cutter) -> SilhouetteResult<()>;
}

/// Checks a target and returns the path of its image file.
///
/// Checks run in order: mesh, single-quad plane, node material, image
/// texture node with an image, unpacked image, existing file.
pub fn validate_target(target: &TargetInfo) -> SilhouetteResult<PathBuf> {
    if target.kind != ObjectKind::Mesh {
        return Err(SilhouetteError::WrongObjectType {
            object: target.name.clone(),
            kind: target.kind.to_string(),
        });
    }
    if target.polygon_count != 1 || target.vertex_count != 4 {
        return Err(SilhouetteError::NotAPlane {
            object: target.name.clone(),
            vertices: target.vertex_count,
            polygons: target.polygon_count,
        });
    }

    let material = match &target.material {
        Some(material) if material.use_nodes => material,
        _ => {
            return Err(SilhouetteError::MissingMaterialNodes {
                object: target.name.clone(),
            })
        }
    };
    let Some(image) = &material.image else {
        return Err(SilhouetteError::MissingImageNode {
            object: target.name.clone(),
        });
    };
    if image.packed {
        return Err(SilhouetteError::PackedImage {
            image: image.name.clone(),
        });
    }

    match &image.filepath {
        Some(path) if path.is_file() => Ok(path.clone()),
        Some(path) => Err(SilhouetteError::ImageNotFound { path: path.clone() }),
        None => Err(SilhouetteError::ImageNotFound {
            path: PathBuf::from(&image.name),
        }),
    }
}

/// Traces the silhouette of `image` and maps it into local space.
///
/// Fails with a degenerate-geometry error when the image has no opaque
/// boundary or fewer than three points survive simplification.
pub fn silhouette_polygon(image: &RasterImage, config: &CutConfig) -> SilhouetteResult<CutterPolygon> {
    let mask = build_mask(image, config.alpha_threshold);
    let contour = trace(&mask);
    if contour.is_empty() {
        return Err(SilhouetteError::EmptyContour);
    }

    let kept = simplify(contour.points(), config.stride);
    debug!(
        contour = contour.len(),
        kept = kept.len(),
        stride = config.stride,
        "Simplified contour"
    );
    if kept.len() < 3 {
        return Err(SilhouetteError::DegeneratePolygon { points: kept.len() });
    }

    let mapper = PixelMapper::new(image.width(), image.height(), config.scale);
    CutterPolygon::new(mapper.map_all(&kept))
}

/// Runs silhouette cuts over a list of objects.
#[derive(Debug, Clone, Default)]
pub struct CutPipeline {
    config: CutConfig,
}

impl CutPipeline {
    pub fn new(config: CutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CutConfig {
        &self.config
    }

    /// Where the cutter for `target` is placed: the target origin pushed back
    /// along the plane normal so the two faces are never coplanar.
    pub fn cutter_location(&self, target: &TargetInfo) -> [f64; 3] {
        let [x, y, z] = target.location;
        [x, y - self.config.cutter_offset, z]
    }

    /// Validates `target`, loads its image and builds a cutter with a face.
    pub fn prepare(&self, target: &TargetInfo) -> SilhouetteResult<CutterMesh> {
        let path = validate_target(target)?;
        let image = load_png(&path)?;
        debug!(
            object = %target.name,
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Loaded sprite image"
        );
        let polygon = silhouette_polygon(&image, &self.config)?;
        let mesh = build_cutter_mesh(self.config.cutter_name.clone(), polygon.points());
        mesh.check_face()?;
        Ok(mesh)
    }

    /// Cuts a single object.
    pub fn cut<H: CutHost>(&self, host: &mut H, object: &str) -> SilhouetteResult<()> {
        let target = host.inspect(object)?;
        let mesh = self.prepare(&target)?;

        let cutter = host.link_cutter(&mesh, self.cutter_location(&target))?;
        let cut = host.knife_project(object, &cutter);
        let removed = host.remove_cutter(cutter);
        cut?;
        removed
    }

    /// Cuts every object in `objects`, recording one entry per object.
    pub fn run<H: CutHost, S: AsRef<str>>(&self, host: &mut H, objects: &[S]) -> BatchReport {
        info!(objects = objects.len(), stride = self.config.stride, "Starting silhouette cut");

        let mut report = BatchReport::new();
        for object in objects {
            let object = object.as_ref();
            match self.cut(host, object) {
                Ok(()) => {
                    info!(object, "Cut finished");
                    report.finished(object);
                }
                Err(err) => {
                    warn!(object, code = err.code(), error = %err, "Cut not applied");
                    report.failed_with(object, &err);
                }
            }
        }

        info!(
            finished = report.finished_count(),
            total = report.entries.len(),
            "Silhouette cut complete"
        );
        report
    }
}

/// Describes `name` from a scene document.
///
/// Relative and `//`-prefixed image paths resolve against `base_dir`.
pub fn inspect_scene(scene: &SceneDocument, name: &str, base_dir: &Path) -> SilhouetteResult<TargetInfo> {
    let object = scene
        .object(name)
        .ok_or_else(|| SilhouetteError::UnknownObject {
            name: name.to_string(),
        })?;

    let (vertex_count, polygon_count) = object
        .mesh
        .as_ref()
        .map_or((0, 0), |mesh| (mesh.vertices.len(), mesh.polygons.len()));

    let material = object
        .active_material()
        .and_then(|slot| scene.material(slot))
        .map(|material| {
            let image = material
                .image_nodes
                .iter()
                .filter_map(|node| node.image.as_deref())
                .find_map(|image| scene.image(image))
                .map(|image| ImageInfo {
                    name: image.name.clone(),
                    filepath: image.filepath.as_deref().map(|p| resolve_path(p, base_dir)),
                    packed: image.packed,
                });
            MaterialInfo {
                name: material.name.clone(),
                use_nodes: material.use_nodes,
                image,
            }
        });

    Ok(TargetInfo {
        name: object.name.clone(),
        kind: object.kind,
        vertex_count,
        polygon_count,
        location: scene.world_location(name).unwrap_or(object.transform.location),
        material,
    })
}

/// Resolves a host image path; `//` marks a path relative to the scene file.
pub fn resolve_path(path: &str, base_dir: &Path) -> PathBuf {
    let trimmed = path.strip_prefix("//").unwrap_or(path);
    let candidate = Path::new(trimmed);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base_dir.join(candidate)
    }
}
