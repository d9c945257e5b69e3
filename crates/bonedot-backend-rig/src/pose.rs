//! Baked pose sampling with run-length keyframe compression.
//!
//! The sampler bakes an action, steps through every frame of the range and
//! reads each pose bone's armature-space matrix. A location or rotation
//! sample is kept only when it moved more than the tolerance away from the
//! last kept sample, so a bone that never moves yields a single key.

use bonedot_spec::config::DEFAULT_EPSILON;
use bonedot_spec::precision::{round6, round_point};
use bonedot_spec::{BakedAnimation, BoneTrack, LocationKey, RotationKey};
use glam::DMat4;
use tracing::{debug, info};

use crate::error::{RigError, RigResult};
use crate::guard::FrameGuard;
use crate::host::AnimationHost;

/// Relative tolerance used alongside the absolute epsilon.
const REL_TOLERANCE: f64 = 1e-9;

/// True when `a` and `b` are within `abs_tol`, or within a relative
/// tolerance of 1e-9 of the larger magnitude.
pub fn is_close(a: f64, b: f64, abs_tol: f64) -> bool {
    let diff = (a - b).abs();
    diff <= (REL_TOLERANCE * a.abs().max(b.abs())).max(abs_tol)
}

/// Rounded 2D location and Z rotation of a pose matrix.
///
/// The rotation is the Z angle of an XYZ Euler decomposition,
/// `atan2(m10, m00)`.
pub fn pose_sample(matrix: &DMat4) -> ([f64; 2], f64) {
    let translation = matrix.w_axis;
    let x_axis = matrix.x_axis;
    (
        round_point([translation.x, translation.y]),
        round6(x_axis.y.atan2(x_axis.x)),
    )
}

/// Accumulates the compressed tracks of one bone.
#[derive(Debug, Clone)]
pub struct TrackBuilder {
    bone: String,
    epsilon: f64,
    location: Vec<LocationKey>,
    rotation: Vec<RotationKey>,
    last_location: Option<[f64; 2]>,
    last_angle: Option<f64>,
}

impl TrackBuilder {
    pub fn new(bone: impl Into<String>, epsilon: f64) -> Self {
        Self {
            bone: bone.into(),
            epsilon,
            location: Vec::new(),
            rotation: Vec::new(),
            last_location: None,
            last_angle: None,
        }
    }

    pub fn bone(&self) -> &str {
        &self.bone
    }

    /// Offers one sample; each channel keeps it only if it changed.
    pub fn push(&mut self, frame: i32, location: [f64; 2], angle: f64) {
        let moved = match self.last_location {
            None => true,
            Some([x, y]) => {
                !is_close(x, location[0], self.epsilon) || !is_close(y, location[1], self.epsilon)
            }
        };
        if moved {
            self.location
                .push(LocationKey::new(frame, location[0], location[1]));
            self.last_location = Some(location);
        }

        let turned = match self.last_angle {
            None => true,
            Some(last) => !is_close(last, angle, self.epsilon),
        };
        if turned {
            self.rotation.push(RotationKey::new(frame, angle));
            self.last_angle = Some(angle);
        }
    }

    pub fn finish(self) -> BoneTrack {
        BoneTrack {
            bone: self.bone,
            location: self.location,
            rotation: self.rotation,
        }
    }
}

/// Samples baked actions into compressed bone tracks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSampler {
    epsilon: f64,
}

impl Default for PoseSampler {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}

impl PoseSampler {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Bakes `action` onto `armature` and samples every frame in
    /// `frame_start..=frame_end`.
    ///
    /// The host's current frame and the armature's active action are
    /// restored before returning, on success and on error. `fps` is the
    /// number of sampled frames.
    pub fn sample<H: AnimationHost + ?Sized>(
        &self,
        host: &mut H,
        armature: &str,
        action: &str,
        frame_start: i32,
        frame_end: i32,
    ) -> RigResult<BakedAnimation> {
        let invalid = || RigError::InvalidFrameRange {
            start: frame_start,
            end: frame_end,
        };
        if frame_end < frame_start {
            return Err(invalid());
        }
        let fps = u32::try_from(i64::from(frame_end) - i64::from(frame_start) + 1)
            .map_err(|_| invalid())?;

        let mut guard = FrameGuard::new(host, armature)?;
        let baked = guard.bake_action(armature, action, frame_start, frame_end)?;
        debug!(armature, action, baked = %baked, "Baked action");

        let mut builders: Vec<TrackBuilder> = guard
            .pose_bones(armature)?
            .into_iter()
            .map(|bone| TrackBuilder::new(bone, self.epsilon))
            .collect();

        for frame in frame_start..=frame_end {
            guard.set_frame(frame)?;
            for builder in &mut builders {
                let matrix = guard.pose_matrix(armature, builder.bone())?;
                let (location, angle) = pose_sample(&matrix);
                builder.push(frame, location, angle);
            }
        }

        let tracks: Vec<BoneTrack> = builders.into_iter().map(TrackBuilder::finish).collect();
        info!(
            armature,
            action,
            frames = fps,
            tracks = tracks.len(),
            keys = tracks
                .iter()
                .map(|t| t.location.len() + t.rotation.len())
                .sum::<usize>(),
            "Sampled animation"
        );

        Ok(BakedAnimation { fps, tracks })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use glam::{DQuat, DVec3};
    use pretty_assertions::assert_eq;

    use super::*;

    /// Host whose bones follow closed-form motions of the frame number.
    struct ScriptedHost {
        frame: i32,
        action: Option<String>,
        bones: Vec<String>,
        motion: HashMap<String, fn(i32) -> DMat4>,
        baked: Vec<String>,
        fail_at: Option<i32>,
    }

    impl ScriptedHost {
        fn new() -> Self {
            Self {
                frame: 100,
                action: Some("rest".to_string()),
                bones: Vec::new(),
                motion: HashMap::new(),
                baked: Vec::new(),
                fail_at: None,
            }
        }

        fn with_bone(mut self, name: &str, motion: fn(i32) -> DMat4) -> Self {
            self.bones.push(name.to_string());
            self.motion.insert(name.to_string(), motion);
            self
        }
    }

    impl AnimationHost for ScriptedHost {
        fn frame_current(&self) -> i32 {
            self.frame
        }

        fn set_frame(&mut self, frame: i32) -> RigResult<()> {
            if Some(frame) == self.fail_at {
                return Err(RigError::host("frame change failed"));
            }
            self.frame = frame;
            Ok(())
        }

        fn active_action(&self, _armature: &str) -> RigResult<Option<String>> {
            Ok(self.action.clone())
        }

        fn set_active_action(&mut self, _armature: &str, action: Option<&str>) -> RigResult<()> {
            self.action = action.map(str::to_string);
            Ok(())
        }

        fn bake_action(&mut self, _armature: &str, action: &str, _: i32, _: i32) -> RigResult<String> {
            let name = crate::host::baked_action_name(action);
            self.baked.push(name.clone());
            self.action = Some(name.clone());
            Ok(name)
        }

        fn pose_bones(&self, _armature: &str) -> RigResult<Vec<String>> {
            Ok(self.bones.clone())
        }

        fn pose_matrix(&self, _armature: &str, bone: &str) -> RigResult<DMat4> {
            let motion = self.motion.get(bone).ok_or_else(|| RigError::UnknownBone {
                armature: "rig".to_string(),
                bone: bone.to_string(),
            })?;
            Ok(motion(self.frame))
        }
    }

    fn still(_: i32) -> DMat4 {
        DMat4::from_translation(DVec3::new(1.0, 2.0, 0.0))
    }

    fn sliding(frame: i32) -> DMat4 {
        DMat4::from_translation(DVec3::new(frame as f64 * 0.5, 0.0, 0.0))
    }

    fn turning(frame: i32) -> DMat4 {
        DMat4::from_quat(DQuat::from_rotation_z(frame as f64 * 0.1))
    }

    fn jitter(frame: i32) -> DMat4 {
        DMat4::from_translation(DVec3::new(frame as f64 * 1e-6, 0.0, 0.0))
    }

    #[test]
    fn test_is_close() {
        assert!(is_close(1.0, 1.000_001, 1e-5));
        assert!(!is_close(1.0, 1.000_1, 1e-5));
        assert!(is_close(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_pose_sample() {
        let m = DMat4::from_scale_rotation_translation(
            DVec3::ONE,
            DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2),
            DVec3::new(0.123_456_78, -2.0, 9.0),
        );
        let (location, angle) = pose_sample(&m);
        assert_eq!(location, [0.123_457, -2.0]);
        assert_eq!(angle, 1.570_796);
    }

    #[test]
    fn test_static_bone_has_one_key() {
        let mut host = ScriptedHost::new().with_bone("still", still);
        let baked = PoseSampler::default()
            .sample(&mut host, "rig", "idle", 1, 10)
            .unwrap();

        assert_eq!(baked.fps, 10);
        let track = baked.track("still").unwrap();
        assert_eq!(track.location, vec![LocationKey::new(1, 1.0, 2.0)]);
        assert_eq!(track.rotation, vec![RotationKey::new(1, 0.0)]);
    }

    #[test]
    fn test_moving_bones_key_every_frame() {
        let mut host = ScriptedHost::new()
            .with_bone("slide", sliding)
            .with_bone("turn", turning);
        let baked = PoseSampler::default()
            .sample(&mut host, "rig", "walk", 0, 4)
            .unwrap();

        assert_eq!(baked.fps, 5);
        let slide = baked.track("slide").unwrap();
        assert_eq!(slide.location.len(), 5);
        assert_eq!(slide.location[4], LocationKey::new(4, 2.0, 0.0));
        assert_eq!(slide.rotation.len(), 1);

        let turn = baked.track("turn").unwrap();
        assert_eq!(turn.location.len(), 1);
        let frames: Vec<i32> = turn.rotation.iter().map(|k| k.frame).collect();
        assert_eq!(frames, vec![0, 1, 2, 3, 4]);
        assert_eq!(turn.rotation[3].angle, 0.3);
    }

    #[test]
    fn test_changes_below_epsilon_accumulate() {
        let mut host = ScriptedHost::new().with_bone("jitter", jitter);
        let baked = PoseSampler::default()
            .sample(&mut host, "rig", "a", 0, 30)
            .unwrap();
        // each step is below epsilon, so keys only appear once the drift
        // from the last kept key exceeds it
        let keys = &baked.track("jitter").unwrap().location;
        assert_eq!(keys[0], LocationKey::new(0, 0.0, 0.0));
        for pair in keys.windows(2) {
            assert!(pair[1].x - pair[0].x > 1e-5);
        }
        assert!(keys.len() >= 2 && keys.len() < 31, "{} keys", keys.len());
    }

    #[test]
    fn test_single_frame_range() {
        let mut host = ScriptedHost::new().with_bone("slide", sliding);
        let baked = PoseSampler::default()
            .sample(&mut host, "rig", "a", 5, 5)
            .unwrap();
        assert_eq!(baked.fps, 1);
        assert_eq!(baked.track("slide").unwrap().location.len(), 1);
    }

    #[test]
    fn test_restores_state() {
        let mut host = ScriptedHost::new().with_bone("slide", sliding);
        PoseSampler::default()
            .sample(&mut host, "rig", "walk", 0, 3)
            .unwrap();
        assert_eq!(host.frame, 100);
        assert_eq!(host.action.as_deref(), Some("rest"));
        assert_eq!(host.baked, vec!["walk_baked".to_string()]);
    }

    #[test]
    fn test_restores_state_after_host_failure() {
        let mut host = ScriptedHost::new().with_bone("slide", sliding);
        host.fail_at = Some(2);
        let err = PoseSampler::default()
            .sample(&mut host, "rig", "walk", 0, 3)
            .unwrap_err();
        assert!(matches!(err, RigError::Host { .. }));
        assert_eq!(host.frame, 100);
        assert_eq!(host.action.as_deref(), Some("rest"));
    }

    #[test]
    fn test_rejects_reversed_range() {
        let mut host = ScriptedHost::new();
        let err = PoseSampler::default()
            .sample(&mut host, "rig", "walk", 10, 2)
            .unwrap_err();
        assert!(matches!(err, RigError::InvalidFrameRange { start: 10, end: 2 }));
        assert!(host.baked.is_empty());
    }

    #[test]
    fn test_rejects_range_wider_than_u32() {
        let mut host = ScriptedHost::new();
        let err = PoseSampler::default()
            .sample(&mut host, "rig", "walk", i32::MIN, i32::MAX)
            .unwrap_err();
        assert!(matches!(
            err,
            RigError::InvalidFrameRange {
                start: i32::MIN,
                end: i32::MAX
            }
        ));
        assert!(host.baked.is_empty());
    }
}
