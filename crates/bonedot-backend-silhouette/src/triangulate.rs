//! In-place triangulation of sprite meshes.

use bonedot_spec::scene::{ObjectKind, SceneDocument};
use tracing::debug;

use crate::error::{SilhouetteError, SilhouetteResult};

/// Fan-triangulates every polygon of `object`, carrying UVs along.
///
/// Returns the number of triangles in the mesh afterwards.
pub fn triangulate_object(scene: &mut SceneDocument, object: &str) -> SilhouetteResult<usize> {
    let target = scene
        .object_mut(object)
        .ok_or_else(|| SilhouetteError::UnknownObject {
            name: object.to_string(),
        })?;

    let kind = target.kind;
    let mesh = match target.mesh.as_mut() {
        Some(mesh) if kind == ObjectKind::Mesh => mesh,
        _ => {
            return Err(SilhouetteError::WrongObjectType {
                object: object.to_string(),
                kind: kind.to_string(),
            })
        }
    };

    let before = mesh.polygons.len();
    let triangles = mesh.triangulate();
    debug!(object, polygons = before, triangles, "Triangulated mesh");
    Ok(triangles)
}
