//! Mesh data as stored in scene documents.

use serde::{Deserialize, Serialize};

/// Polygon mesh with per-loop UVs and vertex-group weights.
///
/// Loops are the polygon corners in polygon order: the loop index of corner
/// `c` of polygon `p` is the number of corners of all polygons before `p`
/// plus `c`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshData {
    /// Vertex positions in object space.
    pub vertices: Vec<[f64; 3]>,
    /// Polygons as vertex index lists.
    #[serde(default)]
    pub polygons: Vec<Vec<u32>>,
    /// Active UV layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_layer: Option<LoopUv>,
    /// Vertex group names, indexed by group index.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertex_groups: Vec<String>,
    /// Locked vertex groups (by name).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locked_groups: Vec<String>,
    /// Group memberships per vertex. May be shorter than `vertices`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<Vec<VertexGroupWeight>>,
}

/// A named UV layer with one coordinate per loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoopUv {
    pub name: String,
    pub uvs: Vec<[f64; 2]>,
}

/// Membership of a vertex in a vertex group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VertexGroupWeight {
    pub group: usize,
    pub weight: f64,
}

impl MeshData {
    /// Total number of loops.
    pub fn loop_count(&self) -> usize {
        self.polygons.iter().map(Vec::len).sum()
    }

    /// `(loop_index, vertex_index)` for every polygon corner.
    pub fn loops(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.polygons
            .iter()
            .flat_map(|poly| poly.iter().copied())
            .enumerate()
    }

    /// Fan triangulation of every polygon.
    ///
    /// Triangles are kept as-is, n-gons become `[v0, vi, vi+1]` fans, and
    /// polygons with fewer than three corners are dropped.
    pub fn fan_triangles(&self) -> Vec<[u32; 3]> {
        let mut triangles = Vec::new();
        for poly in &self.polygons {
            if poly.len() < 3 {
                continue;
            }
            for i in 1..poly.len() - 1 {
                triangles.push([poly[0], poly[i], poly[i + 1]]);
            }
        }
        triangles
    }

    /// Replaces every polygon with its fan triangles, carrying loop UVs along.
    ///
    /// Returns the number of triangles produced.
    pub fn triangulate(&mut self) -> usize {
        let mut polygons = Vec::new();
        let mut uvs = Vec::new();
        let old_uvs = self.uv_layer.as_ref().map(|layer| layer.uvs.as_slice());

        let mut loop_start = 0;
        for poly in &self.polygons {
            if poly.len() >= 3 {
                for i in 1..poly.len() - 1 {
                    polygons.push(vec![poly[0], poly[i], poly[i + 1]]);
                    if let Some(old) = old_uvs {
                        for corner in [0, i, i + 1] {
                            uvs.push(old.get(loop_start + corner).copied().unwrap_or([0.0, 0.0]));
                        }
                    }
                }
            }
            loop_start += poly.len();
        }

        let count = polygons.len();
        self.polygons = polygons;
        if let Some(layer) = self.uv_layer.as_mut() {
            layer.uvs = uvs;
        }
        count
    }

    /// Index of the vertex group called `name`.
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.vertex_groups.iter().position(|g| g == name)
    }
}
