//! Structural checks for export documents.

use std::collections::HashSet;

use super::{ArmatureExport, ExportDocument, MeshExport, BDSKET_FORMAT, BDSKET_VERSION};
use crate::error::{ErrorCode, ValidationError};

/// Validates an export document, returning every problem found.
///
/// An empty vector means the document is well-formed.
pub fn validate_document(doc: &ExportDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if doc.format != BDSKET_FORMAT || doc.version != BDSKET_VERSION {
        errors.push(ValidationError::new(
            ErrorCode::UnsupportedFormat,
            format!(
                "expected format '{}' version {}, got '{}' version {}",
                BDSKET_FORMAT, BDSKET_VERSION, doc.format, doc.version
            ),
        ));
    }

    for (a, armature) in doc.armatures.iter().enumerate() {
        let base = format!("armatures[{}]", a);
        validate_bones(armature, &base, &mut errors);
        for (m, mesh) in armature.meshes.iter().enumerate() {
            validate_mesh(mesh, &format!("{}.meshes[{}]", base, m), &mut errors);
        }
        validate_tracks(armature, &base, &mut errors);
    }

    errors
}

fn validate_bones(armature: &ArmatureExport, base: &str, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for (i, bone) in armature.bones.iter().enumerate() {
        if !seen.insert(bone.name.as_str()) {
            errors.push(ValidationError::with_path(
                ErrorCode::DuplicateBoneName,
                format!("duplicate bone name '{}'", bone.name),
                format!("{}.bones[{}].name", base, i),
            ));
        }
    }

    for (i, bone) in armature.bones.iter().enumerate() {
        if let Some(ref parent) = bone.parent {
            if parent == &bone.name || !seen.contains(parent.as_str()) {
                errors.push(ValidationError::with_path(
                    ErrorCode::UnknownParentBone,
                    format!("bone '{}' has unknown parent '{}'", bone.name, parent),
                    format!("{}.bones[{}].parent", base, i),
                ));
            }
        }
    }
}

fn validate_mesh(mesh: &MeshExport, base: &str, errors: &mut Vec<ValidationError>) {
    let count = mesh.vertices.len();

    if mesh.uvs.len() != count {
        errors.push(ValidationError::with_path(
            ErrorCode::VertexArrayMismatch,
            format!("{} uvs for {} vertices", mesh.uvs.len(), count),
            format!("{}.uvs", base),
        ));
    }
    if mesh.weights.len() != count {
        errors.push(ValidationError::with_path(
            ErrorCode::VertexArrayMismatch,
            format!("{} weight maps for {} vertices", mesh.weights.len(), count),
            format!("{}.weights", base),
        ));
    }

    for (t, tri) in mesh.triangles.iter().enumerate() {
        if let Some(&bad) = tri.iter().find(|&&i| i as usize >= count) {
            errors.push(ValidationError::with_path(
                ErrorCode::TriangleIndexOutOfRange,
                format!("index {} out of range for {} vertices", bad, count),
                format!("{}.triangles[{}]", base, t),
            ));
        }
    }
}

fn validate_tracks(armature: &ArmatureExport, base: &str, errors: &mut Vec<ValidationError>) {
    for (n, anim) in armature.animations.iter().enumerate() {
        for (t, track) in anim.data.tracks.iter().enumerate() {
            let path = format!("{}.animations[{}].data.tracks[{}]", base, n, t);
            if !strictly_increasing(track.location.iter().map(|k| k.frame)) {
                errors.push(ValidationError::with_path(
                    ErrorCode::NonIncreasingTrack,
                    format!("location frames of '{}' are not strictly increasing", track.bone),
                    format!("{}.location", path),
                ));
            }
            if !strictly_increasing(track.rotation.iter().map(|k| k.frame)) {
                errors.push(ValidationError::with_path(
                    ErrorCode::NonIncreasingTrack,
                    format!("rotation frames of '{}' are not strictly increasing", track.bone),
                    format!("{}.rotation", path),
                ));
            }
        }
    }
}

fn strictly_increasing(frames: impl Iterator<Item = i32>) -> bool {
    let mut prev: Option<i32> = None;
    for frame in frames {
        if matches!(prev, Some(p) if frame <= p) {
            return false;
        }
        prev = Some(frame);
    }
    true
}
