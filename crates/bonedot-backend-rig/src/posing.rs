//! Pose evaluation for armatures stored in scene documents.
//!
//! A bone's rest matrix places its head at the origin of a frame whose Y
//! axis runs from head to tail (zero roll). Pose channels (location,
//! rotation, scale) are read from the action's F-curves and applied in the
//! bone's rest frame. The armature-space pose matrix of a bone is
//!
//! ```text
//! root:  rest · basis
//! child: parent_pose · parent_rest⁻¹ · rest · basis
//! ```

use std::f64::consts::PI;

use bonedot_spec::scene::{Action, BoneData};
use glam::{DMat4, DQuat, DVec3};

use crate::error::{RigError, RigResult};

/// Rotation channel representation of a bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationMode {
    /// `rotation_quaternion` (w, x, y, z)
    Quaternion,
    /// `rotation_euler` (XYZ)
    Euler,
}

impl RotationMode {
    pub fn property(&self) -> &'static str {
        match self {
            RotationMode::Quaternion => "rotation_quaternion",
            RotationMode::Euler => "rotation_euler",
        }
    }

    pub fn components(&self) -> usize {
        match self {
            RotationMode::Quaternion => 4,
            RotationMode::Euler => 3,
        }
    }
}

/// Local pose channels of one bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneChannels {
    pub location: DVec3,
    /// Euler angles when `mode` is `Euler`.
    pub euler: DVec3,
    /// Quaternion when `mode` is `Quaternion`.
    pub quaternion: DQuat,
    pub scale: DVec3,
    pub mode: RotationMode,
}

impl Default for BoneChannels {
    fn default() -> Self {
        Self {
            location: DVec3::ZERO,
            euler: DVec3::ZERO,
            quaternion: DQuat::IDENTITY,
            scale: DVec3::ONE,
            mode: RotationMode::Quaternion,
        }
    }
}

impl BoneChannels {
    /// Evaluates the channels of `bone` in `action` at `frame`.
    ///
    /// Channels without a curve keep their rest values. A bone with any
    /// `rotation_euler` curve and no `rotation_quaternion` curve uses Euler
    /// rotation.
    pub fn evaluate(action: Option<&Action>, bone: &str, frame: f64) -> Self {
        let mut channels = Self::default();
        let Some(action) = action else {
            return channels;
        };

        let curves = || {
            action
                .fcurves
                .iter()
                .filter(move |c| c.pose_bone() == Some(bone))
        };
        let has = |property: &str| curves().any(|c| c.property() == Some(property));
        if has("rotation_euler") && !has("rotation_quaternion") {
            channels.mode = RotationMode::Euler;
        }

        let mut quat = [1.0, 0.0, 0.0, 0.0];
        for curve in curves() {
            let value = curve.evaluate(frame);
            let i = curve.array_index;
            match curve.property() {
                Some("location") if i < 3 => channels.location[i] = value,
                Some("rotation_euler") if i < 3 => channels.euler[i] = value,
                Some("rotation_quaternion") if i < 4 => quat[i] = value,
                Some("scale") if i < 3 => channels.scale[i] = value,
                _ => {}
            }
        }

        let [w, x, y, z] = quat;
        let q = DQuat::from_xyzw(x, y, z, w);
        channels.quaternion = if q.length_squared() > 0.0 {
            q.normalize()
        } else {
            DQuat::IDENTITY
        };
        channels
    }

    /// Rotation of the active representation.
    pub fn rotation(&self) -> DQuat {
        match self.mode {
            RotationMode::Quaternion => self.quaternion,
            RotationMode::Euler => {
                DQuat::from_rotation_z(self.euler.z)
                    * DQuat::from_rotation_y(self.euler.y)
                    * DQuat::from_rotation_x(self.euler.x)
            }
        }
    }

    /// Channel values of `property` in curve component order.
    pub fn values(&self, property: &str) -> Vec<f64> {
        match property {
            "location" => self.location.to_array().to_vec(),
            "rotation_euler" => self.euler.to_array().to_vec(),
            "rotation_quaternion" => {
                let q = self.quaternion;
                vec![q.w, q.x, q.y, q.z]
            }
            "scale" => self.scale.to_array().to_vec(),
            _ => Vec::new(),
        }
    }

    /// Local transform from the channels.
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation(), self.location)
    }
}

/// Rest matrix of a bone in armature space.
pub fn rest_matrix(bone: &BoneData) -> DMat4 {
    let head = DVec3::from_array(bone.head_local);
    let tail = DVec3::from_array(bone.tail_local);
    let dir = (tail - head).try_normalize().unwrap_or(DVec3::Y);
    let rotation = if dir.dot(DVec3::Y) < -1.0 + 1e-12 {
        DQuat::from_rotation_z(PI)
    } else {
        DQuat::from_rotation_arc(DVec3::Y, dir)
    };
    DMat4::from_rotation_translation(rotation, head)
}

/// Armature-space pose matrix of `name` under `action` at `frame`.
pub fn pose_matrix(
    armature: &str,
    bones: &[BoneData],
    action: Option<&Action>,
    frame: f64,
    name: &str,
) -> RigResult<DMat4> {
    let find = |bone: &str| {
        bones
            .iter()
            .find(|b| b.name == bone)
            .ok_or_else(|| RigError::UnknownBone {
                armature: armature.to_string(),
                bone: bone.to_string(),
            })
    };

    // collect the chain from `name` up to the root
    let mut chain = vec![find(name)?];
    while let Some(parent) = chain.last().and_then(|b| b.parent.as_deref()) {
        if chain.len() > bones.len() {
            return Err(RigError::host(format!(
                "bone parent cycle in armature '{}' at '{}'",
                armature, parent
            )));
        }
        chain.push(find(parent)?);
    }

    let mut pose = DMat4::IDENTITY;
    let mut parent_rest: Option<DMat4> = None;
    for bone in chain.iter().rev() {
        let rest = rest_matrix(bone);
        let basis = BoneChannels::evaluate(action, &bone.name, frame).matrix();
        pose = match parent_rest {
            None => rest * basis,
            Some(parent_rest) => pose * parent_rest.inverse() * rest * basis,
        };
        parent_rest = Some(rest);
    }
    Ok(pose)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use bonedot_spec::scene::FCurve;

    use super::*;

    fn bone(name: &str, parent: Option<&str>, head: [f64; 3], tail: [f64; 3]) -> BoneData {
        BoneData {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            head_local: head,
            tail_local: tail,
        }
    }

    fn curve(path: &str, index: usize, keys: &[[f64; 2]]) -> FCurve {
        FCurve {
            data_path: path.to_string(),
            array_index: index,
            keyframes: keys.to_vec(),
        }
    }

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_rest_matrix_points_y_along_bone() {
        let m = rest_matrix(&bone("a", None, [1.0, 0.0, 0.0], [3.0, 0.0, 0.0]));
        assert!(close(m.transform_point3(DVec3::ZERO), DVec3::new(1.0, 0.0, 0.0)));
        assert!(close(m.transform_vector3(DVec3::Y), DVec3::X));
        // x axis of a bone pointing +X turns to -Y
        assert!(close(m.transform_vector3(DVec3::X), DVec3::NEG_Y));

        let down = rest_matrix(&bone("b", None, [0.0, 0.0, 0.0], [0.0, -1.0, 0.0]));
        assert!(close(down.transform_vector3(DVec3::Y), DVec3::NEG_Y));
        assert!(close(down.transform_vector3(DVec3::X), DVec3::NEG_X));
    }

    #[test]
    fn test_channels_default_to_rest() {
        let channels = BoneChannels::evaluate(None, "a", 1.0);
        assert_eq!(channels.matrix(), DMat4::IDENTITY);
    }

    #[test]
    fn test_euler_channels() {
        let action = Action {
            name: "turn".to_string(),
            frame_range: [0.0, 10.0],
            fcurves: vec![
                curve("pose.bones[\"a\"].rotation_euler", 2, &[[0.0, 0.0], [10.0, 1.0]]),
                curve("pose.bones[\"a\"].location", 1, &[[0.0, 2.0]]),
                curve("pose.bones[\"b\"].location", 0, &[[0.0, 9.0]]),
            ],
        };
        let channels = BoneChannels::evaluate(Some(&action), "a", 5.0);
        assert_eq!(channels.mode, RotationMode::Euler);
        assert!((channels.euler.z - 0.5).abs() < 1e-12);
        assert_eq!(channels.location, DVec3::new(0.0, 2.0, 0.0));
        assert_eq!(channels.values("location"), vec![0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_root_pose_rotation() {
        let bones = vec![bone("a", None, [0.0, 0.0, 0.0], [0.0, 1.0, 0.0])];
        let action = Action {
            name: "turn".to_string(),
            frame_range: [0.0, 1.0],
            fcurves: vec![curve(
                "pose.bones[\"a\"].rotation_euler",
                2,
                &[[0.0, 0.0], [1.0, FRAC_PI_2]],
            )],
        };

        let rest = pose_matrix("rig", &bones, Some(&action), 0.0, "a").unwrap();
        assert!(close(rest.transform_vector3(DVec3::X), DVec3::X));

        let turned = pose_matrix("rig", &bones, Some(&action), 1.0, "a").unwrap();
        assert!(close(turned.transform_vector3(DVec3::X), DVec3::Y));
    }

    #[test]
    fn test_child_follows_parent() {
        let bones = vec![
            bone("a", None, [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            bone("b", Some("a"), [0.0, 1.0, 0.0], [0.0, 2.0, 0.0]),
        ];
        let action = Action {
            name: "lift".to_string(),
            frame_range: [0.0, 0.0],
            fcurves: vec![curve("pose.bones[\"a\"].location", 0, &[[0.0, 3.0]])],
        };

        let child = pose_matrix("rig", &bones, Some(&action), 0.0, "b").unwrap();
        assert!(close(child.transform_point3(DVec3::ZERO), DVec3::new(3.0, 1.0, 0.0)));

        let rest = pose_matrix("rig", &bones, None, 0.0, "b").unwrap();
        assert!(close(rest.transform_point3(DVec3::ZERO), DVec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_unknown_bone_and_cycle() {
        let bones = vec![
            bone("a", Some("b"), [0.0; 3], [0.0, 1.0, 0.0]),
            bone("b", Some("a"), [0.0; 3], [0.0, 1.0, 0.0]),
        ];
        assert!(matches!(
            pose_matrix("rig", &bones, None, 0.0, "zzz"),
            Err(RigError::UnknownBone { .. })
        ));
        assert!(matches!(
            pose_matrix("rig", &bones, None, 0.0, "a"),
            Err(RigError::Host { .. })
        ));
    }
}
