//! Object and world matrices.
//!
//! Object matrices are `T · Rz · Ry · Rx · S`, the host's XYZ Euler order.
//! World matrices multiply parent matrices from the root down; parent
//! inverse matrices are taken as identity.

use std::collections::HashSet;

use glam::{DMat4, DQuat, DVec3};
use tracing::warn;

use super::{SceneDocument, Transform};

impl Transform {
    /// Rotation as a quaternion, applying X then Y then Z.
    pub fn rotation_quat(&self) -> DQuat {
        let [x, y, z] = self.rotation;
        DQuat::from_rotation_z(z) * DQuat::from_rotation_y(y) * DQuat::from_rotation_x(x)
    }

    /// Local matrix of the transform.
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(
            DVec3::from_array(self.scale),
            self.rotation_quat(),
            DVec3::from_array(self.location),
        )
    }
}

impl SceneDocument {
    /// World matrix of the object called `name`.
    ///
    /// Parents that do not exist end the chain. A parent cycle is broken at
    /// the first repeated object.
    pub fn world_matrix(&self, name: &str) -> Option<DMat4> {
        let mut object = self.object(name)?;
        let mut matrix = object.transform.matrix();
        let mut visited = HashSet::from([object.name.as_str()]);

        while let Some(parent) = object.parent.as_deref().and_then(|p| self.object(p)) {
            if !visited.insert(parent.name.as_str()) {
                warn!(object = name, parent = %parent.name, "Parent cycle in scene document");
                break;
            }
            matrix = parent.transform.matrix() * matrix;
            object = parent;
        }

        Some(matrix)
    }

    /// World location of the origin of `name`.
    pub fn world_location(&self, name: &str) -> Option<[f64; 3]> {
        self.world_matrix(name)
            .map(|m| m.transform_point3(DVec3::ZERO).to_array())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;
    use crate::scene::{ObjectKind, SceneObject};

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_identity() {
        let m = Transform::default().matrix();
        assert_eq!(m, DMat4::IDENTITY);
    }

    #[test]
    fn test_rotation_order() {
        let t = Transform {
            rotation: [FRAC_PI_2, 0.0, FRAC_PI_2],
            ..Default::default()
        };
        // X first takes +Y to +Z, then Z leaves +Z alone
        let p = t.matrix().transform_point3(DVec3::Y).to_array();
        assert!(close(p, [0.0, 0.0, 1.0]), "{:?}", p);
        // X leaves +X alone, then Z takes it to +Y
        let p = t.matrix().transform_point3(DVec3::X).to_array();
        assert!(close(p, [0.0, 1.0, 0.0]), "{:?}", p);
    }

    #[test]
    fn test_parent_chain() {
        let mut scene = SceneDocument::default();
        scene.objects.push(
            SceneObject::new("root", ObjectKind::Empty).with_transform(Transform {
                location: [1.0, 0.0, 0.0],
                scale: [2.0, 2.0, 2.0],
                ..Default::default()
            }),
        );
        scene.objects.push(
            SceneObject::new("child", ObjectKind::Mesh)
                .with_parent("root")
                .with_transform(Transform::at([0.0, 0.0, 3.0])),
        );

        assert!(close(scene.world_location("child").unwrap(), [1.0, 0.0, 6.0]));
        assert!(scene.world_location("missing").is_none());
    }

    #[test]
    fn test_parent_cycle_terminates() {
        let mut scene = SceneDocument::default();
        scene.objects.push(
            SceneObject::new("a", ObjectKind::Empty)
                .with_parent("b")
                .with_transform(Transform::at([1.0, 0.0, 0.0])),
        );
        scene.objects.push(
            SceneObject::new("b", ObjectKind::Empty)
                .with_parent("a")
                .with_transform(Transform::at([0.0, 1.0, 0.0])),
        );
        assert!(close(scene.world_location("a").unwrap(), [1.0, 1.0, 0.0]));
    }
}
