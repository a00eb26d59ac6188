//! Amber Animation Core
//!
//! Skeletal animation runtime: armatures (joint hierarchies), poses (one
//! transform per joint), sequences (keyframe curves) and the operations that
//! combine them. Everything is owned by an [`Instance`] and addressed through
//! generation-checked handles; the [`InstanceTable`] trait is the operation set
//! front ends call through.
//!
//! Typical frame:
//! 1. `sample_pose` each active sequence into a local pose.
//! 2. `blend_poses` / `apply_additive_poses` to layer them.
//! 3. `convert_to_world_pose` before handing the result to skinning.

pub mod accumulate;
pub mod armature;
pub mod baking;
pub mod config;
pub mod error;
pub mod handles;
pub mod instance;
pub mod math;
pub mod ops;
pub mod playback;
pub mod pose;
pub mod sampling;
pub mod scratch;
pub mod sequence;
pub mod table;

// Re-exports for consumers (front ends)
pub use armature::{Armature, ArmatureDesc, ROOT_PARENT};
pub use baking::{export_baked_json, BakedPoses, BakingConfig};
pub use config::Config;
pub use error::{AmberError, AmberResult, ResultCode};
pub use handles::{ArmatureHandle, PoseHandle, SequenceHandle};
pub use instance::Instance;
pub use math::{Quat, Transform, Vec2, Vec3};
pub use playback::{resolve_time, LoopMode};
pub use pose::{PoseDesc, PoseMapping};
pub use sampling::evaluate_curve;
pub use sequence::{Channel, JointCurves, Sequence, SequenceCurve, SequenceDesc, SequenceKey};
pub use table::InstanceTable;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const fn parse_version_part(s: &str) -> u32 {
    let bytes = s.as_bytes();
    let mut value = 0u32;
    let mut i = 0;
    while i < bytes.len() {
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    value
}

pub const VERSION_MAJOR: u32 = parse_version_part(env!("CARGO_PKG_VERSION_MAJOR"));
pub const VERSION_MINOR: u32 = parse_version_part(env!("CARGO_PKG_VERSION_MINOR"));
pub const VERSION_PATCH: u32 = parse_version_part(env!("CARGO_PKG_VERSION_PATCH"));

#[cfg(test)]
mod tests {
    #[test]
    fn version_parts_match_the_version_string() {
        let expected = format!(
            "{}.{}.{}",
            super::VERSION_MAJOR,
            super::VERSION_MINOR,
            super::VERSION_PATCH
        );
        assert!(super::VERSION.starts_with(&expected));
    }
}
