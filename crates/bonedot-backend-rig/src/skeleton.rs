//! Skeleton extraction.

use bonedot_spec::precision::{round6, round_point};
use bonedot_spec::scene::{BoneData, ObjectKind};
use bonedot_spec::BoneRecord;
use glam::{DMat4, DVec3};
use tracing::debug;

use crate::error::{RigError, RigResult};
use crate::host::RigScene;

/// Angle of the segment `head → tail` in radians.
pub fn bone_angle(head: [f64; 2], tail: [f64; 2]) -> f64 {
    (tail[1] - head[1]).atan2(tail[0] - head[0])
}

/// Flattens rest-pose bones into 2D records.
///
/// Heads and tails are transformed by `world` and projected onto XY. The
/// angle is taken before rounding. Records follow the order of `bones`.
pub fn extract_skeleton(world: &DMat4, bones: &[BoneData]) -> Vec<BoneRecord> {
    bones
        .iter()
        .map(|bone| {
            let head = world.transform_point3(DVec3::from_array(bone.head_local));
            let tail = world.transform_point3(DVec3::from_array(bone.tail_local));
            let head = [head.x, head.y];
            let tail = [tail.x, tail.y];
            BoneRecord {
                name: bone.name.clone(),
                parent: bone.parent.clone(),
                head: round_point(head),
                tail: round_point(tail),
                angle: round6(bone_angle(head, tail)),
            }
        })
        .collect()
}

/// Bone records of the armature object called `armature`.
pub fn armature_skeleton<S: RigScene + ?Sized>(scene: &S, armature: &str) -> RigResult<Vec<BoneRecord>> {
    let object = scene
        .object(armature)
        .ok_or_else(|| RigError::unknown_object(armature))?;
    let data = match (&object.armature, object.kind) {
        (Some(data), ObjectKind::Armature) => data,
        _ => {
            return Err(RigError::NotAnArmature {
                object: armature.to_string(),
                kind: object.kind.to_string(),
            })
        }
    };
    let world = scene
        .world_matrix(armature)
        .ok_or_else(|| RigError::unknown_object(armature))?;

    let bones = extract_skeleton(&world, &data.bones);
    debug!(armature, bones = bones.len(), "Extracted skeleton");
    Ok(bones)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use bonedot_spec::scene::{ArmatureData, SceneDocument, SceneObject, Transform};
    use pretty_assertions::assert_eq;

    use super::*;

    fn bone(name: &str, parent: Option<&str>, head: [f64; 3], tail: [f64; 3]) -> BoneData {
        BoneData {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            head_local: head,
            tail_local: tail,
        }
    }

    #[test]
    fn test_chain_pointing_up() {
        let bones = vec![
            bone("A", None, [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            bone("B", Some("A"), [0.0, 1.0, 0.0], [0.0, 2.0, 0.0]),
        ];
        let records = extract_skeleton(&DMat4::IDENTITY, &bones);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].parent, None);
        assert_eq!(records[1].parent.as_deref(), Some("A"));
        assert_eq!(records[1].head, [0.0, 1.0]);
        assert_eq!(records[1].tail, [0.0, 2.0]);
        for record in &records {
            assert_eq!(record.angle, round6(FRAC_PI_2));
            assert_eq!(record.angle, 1.570796);
        }
    }

    #[test]
    fn test_world_matrix_applied() {
        let world = DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0));
        let records = extract_skeleton(
            &world,
            &[bone("root", None, [0.0, 0.0, 0.0], [-1.0, 0.0, 0.5])],
        );
        assert_eq!(records[0].head, [1.0, 2.0]);
        assert_eq!(records[0].tail, [0.0, 2.0]);
        assert_eq!(records[0].angle, round6(std::f64::consts::PI));
    }

    #[test]
    fn test_armature_lookup() {
        let mut rig = SceneObject::new("rig", ObjectKind::Armature)
            .with_transform(Transform::at([0.0, 0.0, 5.0]));
        rig.armature = Some(ArmatureData {
            bones: vec![bone("A", None, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0])],
        });
        let scene = SceneDocument {
            objects: vec![rig, SceneObject::new("body", ObjectKind::Mesh)],
            ..Default::default()
        };

        let records = armature_skeleton(&scene, "rig").unwrap();
        assert_eq!(records[0].angle, 0.0);

        assert!(matches!(
            armature_skeleton(&scene, "body"),
            Err(RigError::NotAnArmature { .. })
        ));
        assert!(matches!(
            armature_skeleton(&scene, "nope"),
            Err(RigError::UnknownObject { .. })
        ));
    }
}
