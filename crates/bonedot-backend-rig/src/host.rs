//! Host collaborator traits.
//!
//! [`RigScene`] is the read-only view export needs: objects, parenting,
//! world matrices, texture images and actions. [`AnimationHost`] drives the
//! host's animation state: the current frame, the armature's active action,
//! baking and pose evaluation.

use bonedot_spec::scene::{Action, ImageData, SceneDocument, SceneObject};
use glam::DMat4;

use crate::error::RigResult;

/// Suffix appended to the copy of an action made for baking.
pub const BAKED_SUFFIX: &str = "_baked";

/// Name of the baked copy of `action`.
pub fn baked_action_name(action: &str) -> String {
    format!("{}{}", action, BAKED_SUFFIX)
}

/// Read access to the scene for export.
pub trait RigScene {
    fn object(&self, name: &str) -> Option<&SceneObject>;

    /// World matrix of an object, `None` when it does not exist.
    fn world_matrix(&self, name: &str) -> Option<DMat4>;

    /// Direct children of `parent`.
    fn children(&self, parent: &str) -> Vec<&SceneObject>;

    /// Images of every image texture node in the material slots of `object`.
    fn object_images(&self, object: &str) -> Vec<&ImageData>;

    /// Every action in the scene.
    fn actions(&self) -> Vec<&Action>;
}

/// Animation state of the host.
pub trait AnimationHost {
    fn frame_current(&self) -> i32;

    fn set_frame(&mut self, frame: i32) -> RigResult<()>;

    /// Action currently assigned to `armature`.
    fn active_action(&self, armature: &str) -> RigResult<Option<String>>;

    fn set_active_action(&mut self, armature: &str, action: Option<&str>) -> RigResult<()>;

    /// Copies `action` to [`baked_action_name`], assigns the copy to
    /// `armature` and bakes its pose channels over the frame range with
    /// visual keying. Returns the name of the baked copy.
    fn bake_action(
        &mut self,
        armature: &str,
        action: &str,
        frame_start: i32,
        frame_end: i32,
    ) -> RigResult<String>;

    /// Pose bone names of `armature`, in armature order.
    fn pose_bones(&self, armature: &str) -> RigResult<Vec<String>>;

    /// Armature-space pose matrix of `bone` at the current frame.
    fn pose_matrix(&self, armature: &str, bone: &str) -> RigResult<DMat4>;
}

impl RigScene for SceneDocument {
    fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    fn world_matrix(&self, name: &str) -> Option<DMat4> {
        SceneDocument::world_matrix(self, name)
    }

    fn children(&self, parent: &str) -> Vec<&SceneObject> {
        self.objects
            .iter()
            .filter(|o| o.parent.as_deref() == Some(parent))
            .collect()
    }

    fn object_images(&self, object: &str) -> Vec<&ImageData> {
        match self.objects.iter().find(|o| o.name == object) {
            Some(obj) => SceneDocument::object_images(self, obj),
            None => Vec::new(),
        }
    }

    fn actions(&self) -> Vec<&Action> {
        self.actions.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use bonedot_spec::scene::ObjectKind;

    use super::*;

    #[test]
    fn test_baked_name() {
        assert_eq!(baked_action_name("walk"), "walk_baked");
    }

    #[test]
    fn test_scene_children() {
        let scene = SceneDocument {
            objects: vec![
                SceneObject::new("rig", ObjectKind::Armature),
                SceneObject::new("body", ObjectKind::Mesh).with_parent("rig"),
                SceneObject::new("other", ObjectKind::Mesh),
            ],
            ..Default::default()
        };
        let children = RigScene::children(&scene, "rig");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "body");
        assert!(RigScene::object_images(&scene, "missing").is_empty());
    }
}
