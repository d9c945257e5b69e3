//! Scoped restore of host animation state.

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::error::RigResult;
use crate::host::AnimationHost;

/// Saves the current frame and an armature's active action, and puts both
/// back when dropped.
///
/// The guard derefs to the host, so sampling code drives the host through
/// it and every early return restores the saved state.
pub struct FrameGuard<'a, H: AnimationHost + ?Sized> {
    host: &'a mut H,
    armature: String,
    frame: i32,
    action: Option<String>,
}

impl<'a, H: AnimationHost + ?Sized> FrameGuard<'a, H> {
    pub fn new(host: &'a mut H, armature: &str) -> RigResult<Self> {
        let frame = host.frame_current();
        let action = host.active_action(armature)?;
        debug!(armature, frame, action = ?action, "Saved animation state");
        Ok(Self {
            host,
            armature: armature.to_string(),
            frame,
            action,
        })
    }

    /// Frame that will be restored.
    pub fn saved_frame(&self) -> i32 {
        self.frame
    }
}

impl<H: AnimationHost + ?Sized> Deref for FrameGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        &*self.host
    }
}

impl<H: AnimationHost + ?Sized> DerefMut for FrameGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        &mut *self.host
    }
}

impl<H: AnimationHost + ?Sized> Drop for FrameGuard<'_, H> {
    fn drop(&mut self) {
        if let Err(err) = self
            .host
            .set_active_action(&self.armature, self.action.as_deref())
        {
            warn!(armature = %self.armature, error = %err, "Failed to restore active action");
        }
        if let Err(err) = self.host.set_frame(self.frame) {
            warn!(frame = self.frame, error = %err, "Failed to restore frame");
        }
    }
}
