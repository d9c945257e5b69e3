//! Animation host backed by a scene document.
//!
//! [`DocumentHost`] owns a [`SceneDocument`] and implements both
//! [`AnimationHost`] and [`RigScene`] on it, so the CLI and tests can run the
//! full export path without an interactive host. Baking evaluates the
//! action's pose channels at every integer frame and writes them as linear
//! keys into the `_baked` copy.

use bonedot_spec::scene::{Action, ArmatureData, FCurve, ImageData, SceneDocument, SceneObject};
use glam::DMat4;
use tracing::debug;

use crate::error::{RigError, RigResult};
use crate::host::{baked_action_name, AnimationHost, RigScene};
use crate::posing::{pose_matrix, BoneChannels};

/// Scene document with mutable animation state.
#[derive(Debug, Clone, Default)]
pub struct DocumentHost {
    scene: SceneDocument,
}

impl DocumentHost {
    pub fn new(scene: SceneDocument) -> Self {
        Self { scene }
    }

    pub fn scene(&self) -> &SceneDocument {
        &self.scene
    }

    pub fn into_scene(self) -> SceneDocument {
        self.scene
    }

    fn armature(&self, name: &str) -> RigResult<(&SceneObject, &ArmatureData)> {
        let object = self
            .scene
            .object(name)
            .ok_or_else(|| RigError::unknown_object(name))?;
        match &object.armature {
            Some(data) => Ok((object, data)),
            None => Err(RigError::NotAnArmature {
                object: name.to_string(),
                kind: object.kind.to_string(),
            }),
        }
    }

    fn find_action(&self, name: &str) -> RigResult<&Action> {
        self.scene
            .action(name)
            .ok_or_else(|| RigError::UnknownAction {
                name: name.to_string(),
            })
    }
}

/// Per-frame keys for every pose channel of every bone over `start..=end`.
fn bake_curves(source: &Action, bones: &ArmatureData, start: i32, end: i32) -> Vec<FCurve> {
    let mut curves = Vec::new();
    for bone in &bones.bones {
        let samples: Vec<(i32, BoneChannels)> = (start..=end)
            .map(|frame| {
                (
                    frame,
                    BoneChannels::evaluate(Some(source), &bone.name, f64::from(frame)),
                )
            })
            .collect();
        let Some((_, first)) = samples.first() else {
            continue;
        };

        let rotation = first.mode.property();
        for property in ["location", rotation, "scale"] {
            let components = match property {
                "location" | "scale" => 3,
                _ => first.mode.components(),
            };
            for index in 0..components {
                curves.push(FCurve {
                    data_path: format!("pose.bones[\"{}\"].{}", bone.name, property),
                    array_index: index,
                    keyframes: samples
                        .iter()
                        .map(|(frame, channels)| {
                            let value = channels.values(property).get(index).copied().unwrap_or(0.0);
                            [f64::from(*frame), value]
                        })
                        .collect(),
                });
            }
        }
    }
    curves
}

impl AnimationHost for DocumentHost {
    fn frame_current(&self) -> i32 {
        self.scene.frame_current
    }

    fn set_frame(&mut self, frame: i32) -> RigResult<()> {
        self.scene.frame_current = frame;
        Ok(())
    }

    fn active_action(&self, armature: &str) -> RigResult<Option<String>> {
        let (object, _) = self.armature(armature)?;
        Ok(object.action.clone())
    }

    fn set_active_action(&mut self, armature: &str, action: Option<&str>) -> RigResult<()> {
        self.armature(armature)?;
        if let Some(name) = action {
            self.find_action(name)?;
        }
        if let Some(object) = self.scene.object_mut(armature) {
            object.action = action.map(str::to_string);
        }
        Ok(())
    }

    fn bake_action(
        &mut self,
        armature: &str,
        action: &str,
        frame_start: i32,
        frame_end: i32,
    ) -> RigResult<String> {
        let (_, bones) = self.armature(armature)?;
        let source = self.find_action(action)?;
        let baked = Action {
            name: baked_action_name(action),
            frame_range: [f64::from(frame_start), f64::from(frame_end)],
            fcurves: bake_curves(source, bones, frame_start, frame_end),
        };
        let name = baked.name.clone();
        debug!(
            armature,
            action,
            baked = %name,
            curves = baked.fcurves.len(),
            "Baked action into document"
        );

        self.scene.actions.retain(|a| a.name != name);
        self.scene.actions.push(baked);
        self.set_active_action(armature, Some(&name))?;
        Ok(name)
    }

    fn pose_bones(&self, armature: &str) -> RigResult<Vec<String>> {
        let (_, data) = self.armature(armature)?;
        Ok(data.bones.iter().map(|b| b.name.clone()).collect())
    }

    fn pose_matrix(&self, armature: &str, bone: &str) -> RigResult<DMat4> {
        let (object, data) = self.armature(armature)?;
        let action = match object.action.as_deref() {
            Some(name) => Some(self.find_action(name)?),
            None => None,
        };
        pose_matrix(
            armature,
            &data.bones,
            action,
            f64::from(self.scene.frame_current),
            bone,
        )
    }
}

impl RigScene for DocumentHost {
    fn object(&self, name: &str) -> Option<&SceneObject> {
        RigScene::object(&self.scene, name)
    }

    fn world_matrix(&self, name: &str) -> Option<DMat4> {
        self.scene.world_matrix(name)
    }

    fn children(&self, parent: &str) -> Vec<&SceneObject> {
        RigScene::children(&self.scene, parent)
    }

    fn object_images(&self, object: &str) -> Vec<&ImageData> {
        RigScene::object_images(&self.scene, object)
    }

    fn actions(&self) -> Vec<&Action> {
        RigScene::actions(&self.scene)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use bonedot_spec::scene::{BoneData, ObjectKind};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::pose::PoseSampler;

    fn rig_scene() -> SceneDocument {
        let mut rig = SceneObject::new("rig", ObjectKind::Armature);
        rig.armature = Some(ArmatureData {
            bones: vec![BoneData {
                name: "arm".to_string(),
                parent: None,
                head_local: [0.0, 0.0, 0.0],
                tail_local: [1.0, 0.0, 0.0],
            }],
        });
        rig.action = Some("idle".to_string());
        SceneDocument {
            frame_current: 12,
            objects: vec![rig],
            actions: vec![
                Action {
                    name: "idle".to_string(),
                    frame_range: [0.0, 0.0],
                    fcurves: Vec::new(),
                },
                Action {
                    name: "swing".to_string(),
                    frame_range: [0.0, 4.0],
                    fcurves: vec![FCurve {
                        data_path: "pose.bones[\"arm\"].rotation_euler".to_string(),
                        array_index: 2,
                        keyframes: vec![[0.0, 0.0], [4.0, FRAC_PI_2]],
                    }],
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_bake_writes_per_frame_keys() {
        let mut host = DocumentHost::new(rig_scene());
        let name = host.bake_action("rig", "swing", 0, 4).unwrap();
        assert_eq!(name, "swing_baked");
        assert_eq!(host.active_action("rig").unwrap().as_deref(), Some("swing_baked"));

        let baked = host.scene().action("swing_baked").unwrap();
        assert_eq!(baked.frame_range, [0.0, 4.0]);
        let z = baked
            .fcurves
            .iter()
            .find(|c| c.property() == Some("rotation_euler") && c.array_index == 2)
            .unwrap();
        assert_eq!(z.keyframes.len(), 5);
        assert!((z.keyframes[2][1] - FRAC_PI_2 / 2.0).abs() < 1e-12);

        // baking again replaces the copy
        host.bake_action("rig", "swing", 0, 2).unwrap();
        let copies = host
            .scene()
            .actions
            .iter()
            .filter(|a| a.name == "swing_baked")
            .count();
        assert_eq!(copies, 1);
    }

    #[test]
    fn test_unknown_action() {
        let mut host = DocumentHost::new(rig_scene());
        assert!(matches!(
            host.bake_action("rig", "missing", 0, 1),
            Err(RigError::UnknownAction { .. })
        ));
        assert!(host.set_active_action("rig", Some("missing")).is_err());
        assert!(host.set_active_action("rig", None).is_ok());
    }

    #[test]
    fn test_sampling_restores_document_state() {
        let mut host = DocumentHost::new(rig_scene());
        let baked = PoseSampler::default()
            .sample(&mut host, "rig", "swing", 0, 4)
            .unwrap();

        assert_eq!(baked.fps, 5);
        let track = baked.track("arm").unwrap();
        // the rest bone points along +X, so its pose X axis starts at -Y
        assert_eq!(track.rotation.len(), 5);
        assert_eq!(track.rotation[0].angle, -1.570796);
        assert_eq!(track.rotation[4].angle, 0.0);
        assert_eq!(track.location.len(), 1);

        assert_eq!(host.frame_current(), 12);
        assert_eq!(host.active_action("rig").unwrap().as_deref(), Some("idle"));
    }
}
