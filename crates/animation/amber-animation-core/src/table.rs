//! The operation set every animation instance exposes.
//!
//! Front ends (a C dispatch table, a scripting binding) program against this
//! trait rather than against [`Instance`](crate::Instance) directly.
//!
//! Every method either succeeds or returns an error before touching any output.
//! Destination poses may share a handle with any source pose.

use crate::armature::ArmatureDesc;
use crate::error::AmberResult;
use crate::handles::{ArmatureHandle, PoseHandle, SequenceHandle};
use crate::pose::{PoseDesc, PoseMapping};
use crate::sequence::SequenceDesc;

pub trait InstanceTable {
    fn create_armature(&mut self, desc: &ArmatureDesc) -> AmberResult<ArmatureHandle>;
    /// Poses and sequences built on the armature must be destroyed first.
    fn destroy_armature(&mut self, armature: ArmatureHandle) -> AmberResult<()>;

    fn create_pose(&mut self, desc: &PoseDesc) -> AmberResult<PoseHandle>;
    fn destroy_pose(&mut self, pose: PoseHandle) -> AmberResult<()>;

    fn create_sequence(&mut self, desc: &SequenceDesc) -> AmberResult<SequenceHandle>;
    fn destroy_sequence(&mut self, sequence: SequenceHandle) -> AmberResult<()>;

    fn copy_pose(&mut self, src: PoseHandle, dst: PoseHandle) -> AmberResult<()>;
    /// `dst[i] = a[i] * b[i]` per joint.
    fn multiply_poses(&mut self, a: PoseHandle, b: PoseHandle, dst: PoseHandle)
        -> AmberResult<()>;
    fn invert_pose(&mut self, src: PoseHandle, dst: PoseHandle) -> AmberResult<()>;

    /// Borrow a pose's transforms for direct reading and writing.
    fn map_pose(&mut self, pose: PoseHandle) -> AmberResult<PoseMapping<'_>>;

    /// End a mapping. Dropping it has the same effect.
    fn unmap_pose(mapping: PoseMapping<'_>) -> PoseHandle
    where
        Self: Sized,
    {
        mapping.unmap()
    }

    /// Reset `dst` to identity and write every curve of `sequence` evaluated at `time`.
    fn sample_pose(&mut self, sequence: SequenceHandle, time: f32, dst: PoseHandle)
        -> AmberResult<()>;

    /// Weighted sum of `sources` with rotations renormalized.
    fn blend_poses(
        &mut self,
        sources: &[PoseHandle],
        weights: &[f32],
        dst: PoseHandle,
    ) -> AmberResult<()>;

    /// Delta that takes `reference` to `src`.
    fn compute_additive_pose(
        &mut self,
        src: PoseHandle,
        reference: PoseHandle,
        dst: PoseHandle,
    ) -> AmberResult<()>;

    /// `base` with each additive layered on in order.
    fn apply_additive_poses(
        &mut self,
        base: PoseHandle,
        additives: &[PoseHandle],
        weights: &[f32],
        dst: PoseHandle,
    ) -> AmberResult<()>;

    fn convert_to_world_pose(&mut self, src: PoseHandle, dst: PoseHandle) -> AmberResult<()>;
    fn convert_to_local_pose(&mut self, src: PoseHandle, dst: PoseHandle) -> AmberResult<()>;
}
