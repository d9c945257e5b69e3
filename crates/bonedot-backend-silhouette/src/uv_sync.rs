//! UV-to-vertex sync.
//!
//! Moves mesh vertices so their X/Y matches their UV position on the sprite
//! image, which lets a UV edit drive the mesh shape.

use bonedot_spec::scene::SceneDocument;
use tracing::debug;

use crate::error::{SilhouetteError, SilhouetteResult};

/// Vertex X/Y for a UV on a `width`×`height` image: `x = (u - 0.5)·W·s`,
/// `y = -(v - 0.5)·H·s`.
pub fn uv_to_vertex(uv: [f64; 2], size: [u32; 2], scale: f64) -> [f64; 2] {
    let [u, v] = uv;
    let [w, h] = size;
    [(u - 0.5) * w as f64 * scale, -(v - 0.5) * h as f64 * scale]
}

/// Rewrites the X/Y of every looped vertex of `object` from its UVs.
///
/// The image size comes from the first image texture node of the first
/// material slot. Vertices shared by several loops take the last loop's UV.
/// Returns the number of loops applied.
pub fn sync_uvs(scene: &mut SceneDocument, object: &str, scale: f64) -> SilhouetteResult<usize> {
    let target = scene
        .object(object)
        .ok_or_else(|| SilhouetteError::UnknownObject {
            name: object.to_string(),
        })?;

    let missing = |message: &str| SilhouetteError::MissingUvSource {
        object: object.to_string(),
        message: message.to_string(),
    };

    let size = target
        .active_material()
        .and_then(|slot| scene.material(slot))
        .filter(|material| material.use_nodes)
        .and_then(|material| {
            material
                .image_nodes
                .iter()
                .filter_map(|node| node.image.as_deref())
                .find_map(|name| scene.image(name))
        })
        .map(|image| image.size)
        .ok_or_else(|| missing("no image texture on the first material"))?;

    let mesh = scene
        .object_mut(object)
        .and_then(|o| o.mesh.as_mut())
        .ok_or_else(|| missing("object has no mesh"))?;
    let layer = mesh
        .uv_layer
        .as_ref()
        .ok_or_else(|| missing("mesh has no UV layer"))?;

    let updates: Vec<(usize, [f64; 2])> = mesh
        .loops()
        .filter_map(|(loop_index, vertex)| {
            layer
                .uvs
                .get(loop_index)
                .map(|uv| (vertex as usize, uv_to_vertex(*uv, size, scale)))
        })
        .collect();

    for (vertex, [x, y]) in &updates {
        if let Some(co) = mesh.vertices.get_mut(*vertex) {
            co[0] = *x;
            co[1] = *y;
        }
    }

    debug!(object, loops = updates.len(), width = size[0], height = size[1], "Synced UVs to vertices");
    Ok(updates.len())
}
