//! Mesh and texture records for export.

use std::collections::BTreeMap;

use bonedot_spec::precision::{round6, round_point};
use bonedot_spec::scene::{ImageData, MeshData, ObjectKind};
use bonedot_spec::{MeshExport, TextureRef};
use glam::{DMat4, DVec3};
use tracing::debug;

use crate::error::{RigError, RigResult};
use crate::host::RigScene;

/// Texture path written for an image: `<texture_dir>/<file name>`.
///
/// Images without a file path fall back to the image name.
pub fn texture_path(image: &ImageData, texture_dir: &str) -> String {
    let file_name = image
        .filepath
        .as_deref()
        .and_then(|path| path.rsplit(['/', '\\']).next())
        .filter(|name| !name.is_empty())
        .unwrap_or(image.name.as_str());
    if texture_dir.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", texture_dir.trim_end_matches('/'), file_name)
    }
}

/// One texture record per image, in the order given.
pub fn texture_refs(images: &[&ImageData], texture_dir: &str) -> Vec<TextureRef> {
    images
        .iter()
        .map(|image| TextureRef {
            texture: texture_path(image, texture_dir),
            size: image.size,
        })
        .collect()
}

/// Object name up to the first `.` (`body.001` → `body`).
pub fn base_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Per-vertex UVs. A vertex shared by several loops takes the UV of the
/// last one; vertices without loops get `[0, 0]`.
pub fn vertex_uvs(mesh: &MeshData) -> Vec<[f64; 2]> {
    let mut uvs = vec![[0.0, 0.0]; mesh.vertices.len()];
    if let Some(layer) = &mesh.uv_layer {
        for (loop_index, vertex) in mesh.loops() {
            if let (Some(slot), Some(uv)) = (uvs.get_mut(vertex as usize), layer.uvs.get(loop_index)) {
                *slot = round_point(*uv);
            }
        }
    }
    uvs
}

/// Per-vertex group weights keyed by group name.
pub fn vertex_weights(mesh: &MeshData) -> Vec<BTreeMap<String, f64>> {
    (0..mesh.vertices.len())
        .map(|v| {
            mesh.weights
                .get(v)
                .map(|memberships| {
                    memberships
                        .iter()
                        .filter_map(|m| {
                            let group = mesh.vertex_groups.get(m.group)?;
                            Some((group.clone(), round6(m.weight)))
                        })
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect()
}

/// Builds the export record of a mesh from its data and world matrix.
pub fn mesh_record(name: &str, mesh: &MeshData, world: &DMat4, texture: String) -> MeshExport {
    let vertices = mesh
        .vertices
        .iter()
        .map(|v| {
            let p = world.transform_point3(DVec3::from_array(*v));
            round_point([p.x, p.y])
        })
        .collect();

    MeshExport {
        name: base_name(name).to_string(),
        vertices,
        uvs: vertex_uvs(mesh),
        triangles: mesh.fan_triangles(),
        texture,
        z_hint: round6(world.w_axis.z),
        weights: vertex_weights(mesh),
    }
}

/// Export record of the mesh object called `object`.
pub fn export_mesh<S: RigScene + ?Sized>(
    scene: &S,
    object: &str,
    texture_dir: &str,
) -> RigResult<MeshExport> {
    let obj = scene
        .object(object)
        .ok_or_else(|| RigError::unknown_object(object))?;
    let mesh = match (&obj.mesh, obj.kind) {
        (Some(mesh), ObjectKind::Mesh) => mesh,
        _ => {
            return Err(RigError::host(format!(
                "object '{}' ({}) has no mesh data",
                object, obj.kind
            )))
        }
    };
    let world = scene
        .world_matrix(object)
        .ok_or_else(|| RigError::unknown_object(object))?;

    let texture = scene
        .object_images(object)
        .first()
        .map(|image| texture_path(image, texture_dir))
        .unwrap_or_else(|| base_name(object).to_string());

    let record = mesh_record(object, mesh, &world, texture);
    debug!(
        object,
        vertices = record.vertices.len(),
        triangles = record.triangles.len(),
        "Exported mesh"
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use bonedot_spec::scene::{
        ImageNode, Interpolation, LoopUv, Material, SceneDocument, SceneObject, Transform,
        VertexGroupWeight,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn image(name: &str, filepath: Option<&str>) -> ImageData {
        ImageData {
            name: name.to_string(),
            filepath: filepath.map(str::to_string),
            packed: false,
            size: [64, 32],
        }
    }

    fn quad() -> MeshData {
        MeshData {
            vertices: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            polygons: vec![vec![0, 1, 2, 3]],
            uv_layer: Some(LoopUv {
                name: "UVMap".to_string(),
                uvs: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            }),
            vertex_groups: vec!["arm".to_string(), "leg".to_string()],
            locked_groups: Vec::new(),
            weights: vec![
                vec![VertexGroupWeight { group: 0, weight: 1.0 }],
                vec![
                    VertexGroupWeight { group: 0, weight: 0.3333333333 },
                    VertexGroupWeight { group: 1, weight: 0.6666666666 },
                ],
            ],
        }
    }

    #[test]
    fn test_texture_path() {
        assert_eq!(
            texture_path(&image("hero", Some("//sprites/hero.png")), "textures"),
            "textures/hero.png"
        );
        assert_eq!(
            texture_path(&image("hero", Some("C:\\art\\hero.png")), "textures/"),
            "textures/hero.png"
        );
        assert_eq!(texture_path(&image("hero", None), "textures"), "textures/hero");
        assert_eq!(texture_path(&image("hero", None), ""), "hero");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("body.001"), "body");
        assert_eq!(base_name("body"), "body");
    }

    #[test]
    fn test_mesh_record() {
        let world = DMat4::from_translation(DVec3::new(2.0, 0.0, -0.5));
        let record = mesh_record("body.002", &quad(), &world, "textures/body.png".to_string());

        assert_eq!(record.name, "body");
        assert_eq!(record.vertices[2], [3.0, 1.0]);
        assert_eq!(record.triangles, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(record.uvs[3], [0.0, 1.0]);
        assert_eq!(record.z_hint, -0.5);
        assert_eq!(record.weights[0].get("arm"), Some(&1.0));
        assert_eq!(record.weights[1].get("arm"), Some(&0.333333));
        assert_eq!(record.weights[1].get("leg"), Some(&0.666667));
        assert!(record.weights[2].is_empty());
        assert_eq!(record.weights.len(), 4);
    }

    #[test]
    fn test_last_loop_wins() {
        let mut mesh = quad();
        mesh.polygons = vec![vec![0, 1, 2], vec![0, 2, 3]];
        mesh.uv_layer = Some(LoopUv {
            name: "UVMap".to_string(),
            uvs: vec![
                [0.1, 0.1],
                [0.2, 0.2],
                [0.3, 0.3],
                [0.9, 0.9],
                [0.8, 0.8],
                [0.7, 0.7],
            ],
        });
        let uvs = vertex_uvs(&mesh);
        assert_eq!(uvs[0], [0.9, 0.9]);
        assert_eq!(uvs[2], [0.8, 0.8]);
        assert_eq!(uvs[1], [0.2, 0.2]);

        mesh.uv_layer = None;
        assert_eq!(vertex_uvs(&mesh), vec![[0.0, 0.0]; 4]);
    }

    #[test]
    fn test_export_mesh_texture_fallback() {
        let mut body = SceneObject::new("body", ObjectKind::Mesh)
            .with_transform(Transform::at([0.0, 0.0, 1.0]));
        body.mesh = Some(quad());
        let mut arm = SceneObject::new("arm.001", ObjectKind::Mesh);
        arm.mesh = Some(quad());
        arm.material_slots = vec!["arm".to_string()];

        let scene = SceneDocument {
            objects: vec![body, arm, SceneObject::new("rig", ObjectKind::Armature)],
            materials: vec![Material {
                name: "arm".to_string(),
                use_nodes: true,
                image_nodes: vec![ImageNode {
                    image: Some("arm".to_string()),
                    interpolation: Interpolation::Closest,
                }],
            }],
            images: vec![image("arm", Some("//arm.png"))],
            ..Default::default()
        };

        let body = export_mesh(&scene, "body", "textures").unwrap();
        assert_eq!(body.texture, "body");
        assert_eq!(body.z_hint, 1.0);

        let arm = export_mesh(&scene, "arm.001", "textures").unwrap();
        assert_eq!(arm.texture, "textures/arm.png");
        assert_eq!(arm.name, "arm");

        assert!(export_mesh(&scene, "rig", "textures").is_err());
        assert!(matches!(
            export_mesh(&scene, "ghost", "textures"),
            Err(RigError::UnknownObject { .. })
        ));
    }
}
