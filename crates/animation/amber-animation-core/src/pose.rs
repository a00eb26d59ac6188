//! Pose store: one local (or world) transform per armature joint.

use std::ops::{Deref, DerefMut};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::handles::{ArmatureHandle, PoseHandle};
use crate::math::Transform;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PoseDesc {
    pub armature: ArmatureHandle,
    /// Initial transforms in joint order; identity when absent.
    #[serde(default)]
    pub joint_transforms: Option<Vec<Transform>>,
}

#[derive(Clone, Debug)]
pub struct Pose {
    pub(crate) armature: ArmatureHandle,
    pub(crate) transforms: Vec<Transform>,
}

impl Pose {
    pub(crate) fn identity(armature: ArmatureHandle, joint_count: usize) -> Self {
        Self {
            armature,
            transforms: vec![Transform::IDENTITY; joint_count],
        }
    }

    #[inline]
    pub fn armature(&self) -> ArmatureHandle {
        self.armature
    }

    #[inline]
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }
}

/// Exclusive, scoped access to a pose's transform buffer.
///
/// Holding a mapping borrows the owning instance mutably, so nothing can grow
/// or shrink a pool while the buffer is exposed. Dropping the mapping unmaps it.
pub struct PoseMapping<'a> {
    pub(crate) handle: PoseHandle,
    pub(crate) transforms: &'a mut [Transform],
}

impl PoseMapping<'_> {
    #[inline]
    pub fn handle(&self) -> PoseHandle {
        self.handle
    }

    /// Release the mapping, returning the handle it was taken from.
    pub fn unmap(self) -> PoseHandle {
        self.handle
    }
}

impl Drop for PoseMapping<'_> {
    fn drop(&mut self) {
        trace!("unmap pose {:#x}", self.handle.0);
    }
}

impl Deref for PoseMapping<'_> {
    type Target = [Transform];

    fn deref(&self) -> &[Transform] {
        self.transforms
    }
}

impl DerefMut for PoseMapping<'_> {
    fn deref_mut(&mut self) -> &mut [Transform] {
        self.transforms
    }
}
