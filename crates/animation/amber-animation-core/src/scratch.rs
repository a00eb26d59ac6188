//! Per-instance transform scratch.
//!
//! Operations compute into this buffer and copy into the destination pose only
//! once every argument has been checked, so a destination may share a handle
//! with any of its sources.

use crate::config::Config;
use crate::math::Transform;

#[derive(Debug, Default)]
pub struct Scratch {
    transforms: Vec<Transform>,
}

impl Scratch {
    pub fn new(cfg: &Config) -> Self {
        Self {
            transforms: Vec::with_capacity(cfg.scratch_joints),
        }
    }

    /// Buffer of exactly `joint_count` transforms. Contents are unspecified.
    pub fn transforms(&mut self, joint_count: usize) -> &mut [Transform] {
        if self.transforms.len() < joint_count {
            log::trace!(
                "scratch grows from {} to {} joints",
                self.transforms.len(),
                joint_count
            );
            self.transforms.resize(joint_count, Transform::ZERO);
        }
        &mut self.transforms[..joint_count]
    }

    /// The first `joint_count` transforms written through [`Scratch::transforms`].
    pub fn staged(&self, joint_count: usize) -> &[Transform] {
        &self.transforms[..joint_count.min(self.transforms.len())]
    }

    pub fn capacity(&self) -> usize {
        self.transforms.capacity()
    }

    pub fn release(&mut self) {
        self.transforms = Vec::new();
    }
}
