//! `.bdsket` export assembly.
//!
//! For every selected armature the exporter gathers the child meshes and
//! their textures, the flattened rest skeleton and one sampled animation per
//! action that animates the armature's bones. Selected objects that are not
//! armatures are reported and skipped; the batch keeps going.

use bonedot_spec::scene::{Action, ArmatureData, ObjectKind};
use bonedot_spec::{
    AnimationExport, ArmatureExport, BatchReport, ExportConfig, ExportDocument, MeshExport,
    TextureRef,
};
use tracing::{info, warn};

use crate::error::{RigError, RigResult};
use crate::host::{baked_action_name, AnimationHost, RigScene};
use crate::mesh_export::{export_mesh, texture_refs};
use crate::pose::PoseSampler;
use crate::skeleton::armature_skeleton;

/// True when `action` has an F-curve on `pose.bones["<bone>"]` for a bone
/// of `armature`.
pub fn action_affects_armature(action: &Action, armature: &ArmatureData) -> bool {
    action
        .fcurves
        .iter()
        .filter_map(|curve| curve.pose_bone())
        .any(|bone| armature.bone(bone).is_some())
}

/// Integer frame range of an action, truncated toward zero.
pub fn action_frames(action: &Action) -> (i32, i32) {
    (action.frame_range[0] as i32, action.frame_range[1] as i32)
}

/// Assembles export documents from a host.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Exports every armature in `selection`.
    ///
    /// Fails only when the selection is empty. Per-object failures land in
    /// the returned report and the object is left out of the document.
    pub fn export<H, S>(&self, host: &mut H, selection: &[S]) -> RigResult<(ExportDocument, BatchReport)>
    where
        H: AnimationHost + RigScene + ?Sized,
        S: AsRef<str>,
    {
        if selection.is_empty() {
            return Err(RigError::EmptySelection);
        }

        let mut report = BatchReport::new();
        let mut armatures = Vec::new();
        for name in selection {
            let name = name.as_ref();
            match self.export_armature(host, name) {
                Ok(armature) => {
                    armatures.push(armature);
                    report.finished(name);
                }
                Err(err) => {
                    warn!(object = name, error = %err, "Export skipped object");
                    report.failed_with(name, &err);
                }
            }
        }

        info!(
            armatures = armatures.len(),
            failed = selection.len() - armatures.len(),
            "Export assembled"
        );
        Ok((ExportDocument::new(armatures), report))
    }

    /// Exports a single armature object.
    pub fn export_armature<H>(&self, host: &mut H, name: &str) -> RigResult<ArmatureExport>
    where
        H: AnimationHost + RigScene + ?Sized,
    {
        let (textures, meshes, actions) = self.collect_static(&*host, name)?;
        let bones = armature_skeleton(&*host, name)?;

        let sampler = PoseSampler::new(self.config.epsilon);
        let mut animations = Vec::with_capacity(actions.len());
        for (action, (start, end)) in actions {
            let data = sampler.sample(host, name, &action, start, end)?;
            animations.push(AnimationExport { name: action, data });
        }

        Ok(ArmatureExport {
            name: name.to_string(),
            textures,
            meshes,
            bones,
            animations,
        })
    }

    /// Everything read before any host state changes: textures, meshes and
    /// the actions to sample.
    #[allow(clippy::type_complexity)]
    fn collect_static<S: RigScene + ?Sized>(
        &self,
        scene: &S,
        name: &str,
    ) -> RigResult<(Vec<TextureRef>, Vec<MeshExport>, Vec<(String, (i32, i32))>)> {
        let object = scene
            .object(name)
            .ok_or_else(|| RigError::unknown_object(name))?;
        let armature = match (&object.armature, object.kind) {
            (Some(data), ObjectKind::Armature) => data,
            _ => {
                return Err(RigError::NotAnArmature {
                    object: name.to_string(),
                    kind: object.kind.to_string(),
                })
            }
        };

        let children: Vec<String> = scene
            .children(name)
            .into_iter()
            .filter(|child| child.kind == ObjectKind::Mesh)
            .map(|child| child.name.clone())
            .collect();

        let mut textures = Vec::new();
        let mut meshes = Vec::with_capacity(children.len());
        for child in &children {
            textures.extend(texture_refs(&scene.object_images(child), &self.config.texture_dir));
            meshes.push(export_mesh(scene, child, &self.config.texture_dir)?);
        }

        let all = scene.actions();
        let actions = all
            .iter()
            .filter(|action| action_affects_armature(action, armature))
            // skip copies left behind by an earlier bake
            .filter(|action| {
                !all.iter()
                    .any(|source| baked_action_name(&source.name) == action.name)
            })
            .map(|action| (action.name.clone(), action_frames(action)))
            .collect();

        Ok((textures, meshes, actions))
    }
}
