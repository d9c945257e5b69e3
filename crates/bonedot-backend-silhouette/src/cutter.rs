//! Planar cutter mesh construction.
//!
//! A cutter is a single-face mesh lying in the sprite plane (world XZ, with
//! Y held at zero). The host projects its outline onto the target plane to
//! split the sprite along the silhouette.

use bonedot_spec::scene::MeshData;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SilhouetteError, SilhouetteResult};
use crate::mapping::LocalPoint;

/// Tolerance for coincident points and zero-area checks.
const GEOMETRY_EPSILON: f64 = 1e-12;

/// Outline of a cutter face with at least three points.
#[derive(Debug, Clone, PartialEq)]
pub struct CutterPolygon {
    points: Vec<LocalPoint>,
}

impl CutterPolygon {
    /// Wraps `points`, rejecting outlines with fewer than three points.
    pub fn new(points: Vec<LocalPoint>) -> SilhouetteResult<Self> {
        if points.len() < 3 {
            return Err(SilhouetteError::DegeneratePolygon {
                points: points.len(),
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[LocalPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Signed shoelace area; positive for counter-clockwise outlines.
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }
}

/// A planar mesh with at most one face.
///
/// When face construction fails the vertices are still kept and the reason
/// is recorded in `failure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutterMesh {
    pub name: String,
    /// World-axis vertices `(x, 0, y)` in input order.
    pub vertices: Vec<[f64; 3]>,
    /// Zero or one face, winding follows the input order.
    pub faces: Vec<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl CutterMesh {
    pub fn is_faceless(&self) -> bool {
        self.faces.is_empty()
    }

    /// Converts the face failure into an error.
    pub fn check_face(&self) -> SilhouetteResult<()> {
        match &self.failure {
            Some(reason) => Err(SilhouetteError::face_failed(reason.clone())),
            None => Ok(()),
        }
    }

    /// Mesh data for inserting the cutter into a scene document.
    pub fn to_mesh_data(&self) -> MeshData {
        MeshData {
            vertices: self.vertices.clone(),
            polygons: self.faces.clone(),
            ..MeshData::default()
        }
    }
}

/// Builds the cutter mesh for `points`.
pub fn build_cutter_mesh(name: impl Into<String>, points: &[LocalPoint]) -> CutterMesh {
    let name = name.into();
    let vertices = points.iter().map(|p| [p.x, 0.0, p.y]).collect();

    let (faces, failure) = match check_face(points) {
        Ok(()) => (vec![(0..points.len() as u32).collect()], None),
        Err(reason) => {
            warn!(cutter = %name, points = points.len(), reason = %reason, "Cutter face not created");
            (Vec::new(), Some(reason))
        }
    };

    debug!(cutter = %name, vertices = points.len(), "Built cutter mesh");

    CutterMesh {
        name,
        vertices,
        faces,
        failure,
    }
}

/// Checks that `points` form a simple polygon with non-zero area.
pub fn check_face(points: &[LocalPoint]) -> Result<(), String> {
    let n = points.len();
    if n < 3 {
        return Err(format!("{} point(s), at least 3 are required", n));
    }

    for i in 0..n {
        for j in i + 1..n {
            if coincident(points[i], points[j]) {
                return Err(format!("points {} and {} coincide", i, j));
            }
        }
    }

    if signed_area(points).abs() <= GEOMETRY_EPSILON {
        return Err("polygon has zero area".to_string());
    }

    for i in 0..n {
        for j in i + 2..n {
            // first and last edges share a vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            let (a, b) = (points[i], points[(i + 1) % n]);
            let (c, d) = (points[j], points[(j + 1) % n]);
            if segments_intersect(a, b, c, d) {
                return Err(format!("edges {} and {} intersect", i, j));
            }
        }
    }

    Ok(())
}

fn coincident(a: LocalPoint, b: LocalPoint) -> bool {
    (a.x - b.x).abs() <= GEOMETRY_EPSILON && (a.y - b.y).abs() <= GEOMETRY_EPSILON
}

fn signed_area(points: &[LocalPoint]) -> f64 {
    let n = points.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let (p, q) = (points[i], points[(i + 1) % n]);
            p.x * q.y - q.x * p.y
        })
        .sum();
    twice / 2.0
}

fn orient(a: LocalPoint, b: LocalPoint, c: LocalPoint) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// `p` lies within the bounding box of segment `ab`. Only meaningful when
/// the three points are collinear.
fn within(a: LocalPoint, b: LocalPoint, p: LocalPoint) -> bool {
    p.x >= a.x.min(b.x) - GEOMETRY_EPSILON
        && p.x <= a.x.max(b.x) + GEOMETRY_EPSILON
        && p.y >= a.y.min(b.y) - GEOMETRY_EPSILON
        && p.y <= a.y.max(b.y) + GEOMETRY_EPSILON
}

fn segments_intersect(a: LocalPoint, b: LocalPoint, c: LocalPoint, d: LocalPoint) -> bool {
    let d1 = orient(c, d, a);
    let d2 = orient(c, d, b);
    let d3 = orient(a, b, c);
    let d4 = orient(a, b, d);

    let straddles = |p: f64, q: f64| {
        (p > GEOMETRY_EPSILON && q < -GEOMETRY_EPSILON)
            || (p < -GEOMETRY_EPSILON && q > GEOMETRY_EPSILON)
    };
    if straddles(d1, d2) && straddles(d3, d4) {
        return true;
    }

    (d1.abs() <= GEOMETRY_EPSILON && within(c, d, a))
        || (d2.abs() <= GEOMETRY_EPSILON && within(c, d, b))
        || (d3.abs() <= GEOMETRY_EPSILON && within(a, b, c))
        || (d4.abs() <= GEOMETRY_EPSILON && within(a, b, d))
}
