//! Instance: the owner of every armature, pose and sequence.
//!
//! An instance holds one pool per object kind plus a scratch buffer. There is
//! no state shared between instances; each one can live on its own thread as
//! long as calls into it are serialized.
//!
//! Pose operations follow one pattern:
//! 1. Resolve and check every handle (and that all poses share one armature).
//! 2. Compute into scratch.
//! 3. Copy scratch into the destination.
//!
//! A rejected call therefore never leaves a half-written destination, and a
//! destination may alias any source.

use amber_pool::{Pool, MAX_ELEMENTS};
use log::{debug, error, warn};

use crate::accumulate::BlendAccumulator;
use crate::armature::{Armature, ArmatureDesc};
use crate::baking::{self, BakedPoses, BakingConfig};
use crate::config::Config;
use crate::error::{AmberError, AmberResult};
use crate::handles::{ArmatureHandle, PoseHandle, SequenceHandle};
use crate::math::Transform;
use crate::ops;
use crate::pose::{Pose, PoseDesc, PoseMapping};
use crate::sampling::sample_sequence;
use crate::scratch::Scratch;
use crate::sequence::{Sequence, SequenceDesc};
use crate::table::InstanceTable;

#[derive(Debug)]
pub struct Instance {
    cfg: Config,
    armatures: Pool<Armature>,
    poses: Pool<Pose>,
    sequences: Pool<Sequence>,
    scratch: Scratch,
}

impl Default for Instance {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn pool_capacity(requested: usize) -> u32 {
    u32::try_from(requested).unwrap_or(MAX_ELEMENTS)
}

fn armature_ref(armatures: &Pool<Armature>, handle: ArmatureHandle) -> AmberResult<&Armature> {
    armatures
        .get(handle.pool_handle())
        .ok_or(AmberError::InvalidHandle {
            kind: "armature",
            handle: handle.0,
        })
}

fn pose_ref(poses: &Pool<Pose>, handle: PoseHandle) -> AmberResult<&Pose> {
    poses.get(handle.pool_handle()).ok_or(AmberError::InvalidHandle {
        kind: "pose",
        handle: handle.0,
    })
}

fn sequence_ref(sequences: &Pool<Sequence>, handle: SequenceHandle) -> AmberResult<&Sequence> {
    sequences
        .get(handle.pool_handle())
        .ok_or(AmberError::InvalidHandle {
            kind: "sequence",
            handle: handle.0,
        })
}

/// `other` must be built on the same armature as `pose` (and so have as many joints).
fn check_compatible(pose: &Pose, other: &Pose) -> AmberResult<()> {
    if pose.armature != other.armature {
        return Err(AmberError::ArmatureMismatch {
            expected: pose.armature.0,
            found: other.armature.0,
        });
    }
    if pose.transforms.len() != other.transforms.len() {
        return Err(AmberError::CountMismatch {
            what: "joint transforms",
            expected: pose.transforms.len(),
            found: other.transforms.len(),
        });
    }
    Ok(())
}

fn check_weights(poses: usize, weights: usize) -> AmberResult<()> {
    if poses != weights {
        return Err(AmberError::CountMismatch {
            what: "weights",
            expected: poses,
            found: weights,
        });
    }
    Ok(())
}

fn commit(poses: &mut Pool<Pose>, dst: PoseHandle, staged: &[Transform]) -> AmberResult<()> {
    let pose = poses
        .get_mut(dst.pool_handle())
        .ok_or(AmberError::InvalidHandle {
            kind: "pose",
            handle: dst.0,
        })?;
    if pose.transforms.len() != staged.len() {
        return Err(AmberError::CountMismatch {
            what: "joint transforms",
            expected: pose.transforms.len(),
            found: staged.len(),
        });
    }
    pose.transforms.copy_from_slice(staged);
    Ok(())
}

fn rejected(op: &'static str, err: AmberError) -> AmberError {
    error!("{op} rejected ({}): {err}", err.category());
    err
}

impl Instance {
    pub fn new(cfg: Config) -> Self {
        debug!(
            "instance create: armatures={} poses={} sequences={}",
            cfg.armature_capacity, cfg.pose_capacity, cfg.sequence_capacity
        );
        Self {
            armatures: Pool::with_capacity(pool_capacity(cfg.armature_capacity)),
            poses: Pool::with_capacity(pool_capacity(cfg.pose_capacity)),
            sequences: Pool::with_capacity(pool_capacity(cfg.sequence_capacity)),
            scratch: Scratch::new(&cfg),
            cfg,
        }
    }

    /// Destroy the instance and everything it owns. Equivalent to dropping it.
    pub fn destroy(mut self) {
        self.teardown();
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Poses go first, then sequences, then the armatures they were built on.
    fn teardown(&mut self) {
        let poses = self.poses.drain().count();
        let sequences = self.sequences.drain().count();
        let armatures = self.armatures.drain().count();
        if poses + sequences + armatures > 0 {
            debug!(
                "instance teardown: released {poses} poses, {sequences} sequences, {armatures} armatures"
            );
        }
        self.poses.shutdown();
        self.sequences.shutdown();
        self.armatures.shutdown();
        self.scratch.release();
    }

    /// Run `stage` against the pools, then copy what it staged into `dst`.
    ///
    /// `stage` resolves and checks its own arguments (including `dst`) and
    /// returns how many transforms it wrote to scratch.
    fn staged_into<F>(&mut self, op: &'static str, dst: PoseHandle, stage: F) -> AmberResult<()>
    where
        F: FnOnce(
            &Pool<Armature>,
            &Pool<Pose>,
            &Pool<Sequence>,
            &mut Scratch,
        ) -> AmberResult<usize>,
    {
        stage(&self.armatures, &self.poses, &self.sequences, &mut self.scratch)
            .and_then(|n| commit(&mut self.poses, dst, self.scratch.staged(n)))
            .map_err(|err| rejected(op, err))
    }

    // ---- inspection ----

    pub fn armature(&self, armature: ArmatureHandle) -> AmberResult<&Armature> {
        armature_ref(&self.armatures, armature)
    }

    pub fn armature_joint_count(&self, armature: ArmatureHandle) -> AmberResult<usize> {
        Ok(self.armature(armature)?.joint_count())
    }

    pub fn armature_joint_parents(&self, armature: ArmatureHandle) -> AmberResult<&[i32]> {
        Ok(self.armature(armature)?.joint_parents())
    }

    /// `None` when the armature was created without names or `joint` is out of range.
    pub fn armature_joint_name(
        &self,
        armature: ArmatureHandle,
        joint: usize,
    ) -> AmberResult<Option<&str>> {
        Ok(self.armature(armature)?.joint_name(joint))
    }

    pub fn find_joint(&self, armature: ArmatureHandle, name: &str) -> AmberResult<Option<usize>> {
        Ok(self.armature(armature)?.find_joint(name))
    }

    pub fn pose_armature(&self, pose: PoseHandle) -> AmberResult<ArmatureHandle> {
        Ok(pose_ref(&self.poses, pose)?.armature)
    }

    /// Read-only view of a pose's transforms.
    pub fn pose_transforms(&self, pose: PoseHandle) -> AmberResult<&[Transform]> {
        Ok(&pose_ref(&self.poses, pose)?.transforms)
    }

    pub fn sequence(&self, sequence: SequenceHandle) -> AmberResult<&Sequence> {
        sequence_ref(&self.sequences, sequence)
    }

    pub fn sequence_time_range(&self, sequence: SequenceHandle) -> AmberResult<(f32, f32)> {
        Ok(self.sequence(sequence)?.time_range())
    }

    /// Live armatures in creation order.
    pub fn armatures(&self) -> impl Iterator<Item = ArmatureHandle> + '_ {
        self.armatures.handles().map(ArmatureHandle::from)
    }

    pub fn poses(&self) -> impl Iterator<Item = PoseHandle> + '_ {
        self.poses.handles().map(PoseHandle::from)
    }

    pub fn sequences(&self) -> impl Iterator<Item = SequenceHandle> + '_ {
        self.sequences.handles().map(SequenceHandle::from)
    }

    pub fn armature_count(&self) -> usize {
        self.armatures.len()
    }

    pub fn pose_count(&self) -> usize {
        self.poses.len()
    }

    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Sample `sequence` at a fixed rate into a list of local poses.
    ///
    /// Fails with `CountMismatch` when the window needs more than
    /// `cfg.max_frames` frames.
    pub fn bake_sequence(
        &self,
        sequence: SequenceHandle,
        cfg: &BakingConfig,
    ) -> AmberResult<BakedPoses> {
        let seq =
            sequence_ref(&self.sequences, sequence).map_err(|e| rejected("bake_sequence", e))?;
        let joint_count = armature_ref(&self.armatures, seq.armature())
            .map_err(|e| rejected("bake_sequence", e))?
            .joint_count();
        baking::bake_sequence(seq, joint_count, cfg).map_err(|e| rejected("bake_sequence", e))
    }
}

impl InstanceTable for Instance {
    fn create_armature(&mut self, desc: &ArmatureDesc) -> AmberResult<ArmatureHandle> {
        let armature = Armature::from_desc(desc).map_err(|e| rejected("create_armature", e))?;
        let joints = armature.joint_count();
        let handle = ArmatureHandle::from(
            self.armatures
                .insert(armature)
                .map_err(|e| rejected("create_armature", e.into()))?,
        );
        debug!("create armature {:#x} ({joints} joints)", handle.0);
        Ok(handle)
    }

    fn destroy_armature(&mut self, armature: ArmatureHandle) -> AmberResult<()> {
        let handle = armature.pool_handle();
        if self.armatures.contains(handle) {
            let poses = self.poses.iter().filter(|(_, p)| p.armature == armature).count();
            let sequences = self
                .sequences
                .iter()
                .filter(|(_, s)| s.armature() == armature)
                .count();
            if poses + sequences > 0 {
                warn!(
                    "destroying armature {:#x} still used by {poses} poses and {sequences} sequences",
                    armature.0
                );
            }
        }
        self.armatures
            .remove(handle)
            .map_err(|e| rejected("destroy_armature", e.into()))?;
        debug!("destroy armature {:#x}", armature.0);
        Ok(())
    }

    fn create_pose(&mut self, desc: &PoseDesc) -> AmberResult<PoseHandle> {
        let joint_count = armature_ref(&self.armatures, desc.armature)
            .map_err(|e| rejected("create_pose", e))?
            .joint_count();
        let pose = match &desc.joint_transforms {
            None => Pose::identity(desc.armature, joint_count),
            Some(transforms) if transforms.len() == joint_count => Pose {
                armature: desc.armature,
                transforms: transforms.clone(),
            },
            Some(transforms) => {
                return Err(rejected(
                    "create_pose",
                    AmberError::CountMismatch {
                        what: "joint transforms",
                        expected: joint_count,
                        found: transforms.len(),
                    },
                ))
            }
        };
        let handle = PoseHandle::from(
            self.poses
                .insert(pose)
                .map_err(|e| rejected("create_pose", e.into()))?,
        );
        debug!("create pose {:#x} on armature {:#x}", handle.0, desc.armature.0);
        Ok(handle)
    }

    fn destroy_pose(&mut self, pose: PoseHandle) -> AmberResult<()> {
        self.poses
            .remove(pose.pool_handle())
            .map_err(|e| rejected("destroy_pose", e.into()))?;
        debug!("destroy pose {:#x}", pose.0);
        Ok(())
    }

    fn create_sequence(&mut self, desc: &SequenceDesc) -> AmberResult<SequenceHandle> {
        let sequence = armature_ref(&self.armatures, desc.armature)
            .and_then(|armature| Sequence::from_desc(desc, armature.joint_count()))
            .map_err(|e| rejected("create_sequence", e))?;
        let (min_time, max_time) = sequence.time_range();
        let handle = SequenceHandle::from(
            self.sequences
                .insert(sequence)
                .map_err(|e| rejected("create_sequence", e.into()))?,
        );
        debug!(
            "create sequence {:#x} on armature {:#x} over [{min_time}, {max_time}]",
            handle.0, desc.armature.0
        );
        Ok(handle)
    }

    fn destroy_sequence(&mut self, sequence: SequenceHandle) -> AmberResult<()> {
        self.sequences
            .remove(sequence.pool_handle())
            .map_err(|e| rejected("destroy_sequence", e.into()))?;
        debug!("destroy sequence {:#x}", sequence.0);
        Ok(())
    }

    fn copy_pose(&mut self, src: PoseHandle, dst: PoseHandle) -> AmberResult<()> {
        self.staged_into("copy_pose", dst, |_, poses, _, scratch| {
            let src = pose_ref(poses, src)?;
            check_compatible(pose_ref(poses, dst)?, src)?;
            let out = scratch.transforms(src.transforms.len());
            ops::copy(&src.transforms, out);
            Ok(out.len())
        })
    }

    fn multiply_poses(
        &mut self,
        a: PoseHandle,
        b: PoseHandle,
        dst: PoseHandle,
    ) -> AmberResult<()> {
        self.staged_into("multiply_poses", dst, |_, poses, _, scratch| {
            let (a, b) = (pose_ref(poses, a)?, pose_ref(poses, b)?);
            let target = pose_ref(poses, dst)?;
            check_compatible(target, a)?;
            check_compatible(target, b)?;
            let out = scratch.transforms(target.transforms.len());
            ops::multiply(&a.transforms, &b.transforms, out);
            Ok(out.len())
        })
    }

    fn invert_pose(&mut self, src: PoseHandle, dst: PoseHandle) -> AmberResult<()> {
        self.staged_into("invert_pose", dst, |_, poses, _, scratch| {
            let src = pose_ref(poses, src)?;
            check_compatible(pose_ref(poses, dst)?, src)?;
            let out = scratch.transforms(src.transforms.len());
            ops::invert(&src.transforms, out);
            Ok(out.len())
        })
    }

    fn map_pose(&mut self, pose: PoseHandle) -> AmberResult<PoseMapping<'_>> {
        let entry = self
            .poses
            .get_mut(pose.pool_handle())
            .ok_or(AmberError::InvalidHandle {
                kind: "pose",
                handle: pose.0,
            })
            .map_err(|e| rejected("map_pose", e))?;
        log::trace!("map pose {:#x}", pose.0);
        Ok(PoseMapping {
            handle: pose,
            transforms: &mut entry.transforms,
        })
    }

    fn sample_pose(
        &mut self,
        sequence: SequenceHandle,
        time: f32,
        dst: PoseHandle,
    ) -> AmberResult<()> {
        self.staged_into("sample_pose", dst, |_, poses, sequences, scratch| {
            let seq = sequence_ref(sequences, sequence)?;
            let target = pose_ref(poses, dst)?;
            if seq.armature() != target.armature {
                return Err(AmberError::ArmatureMismatch {
                    expected: target.armature.0,
                    found: seq.armature().0,
                });
            }
            let out = scratch.transforms(target.transforms.len());
            sample_sequence(seq, time, out);
            Ok(out.len())
        })
    }

    fn blend_poses(
        &mut self,
        sources: &[PoseHandle],
        weights: &[f32],
        dst: PoseHandle,
    ) -> AmberResult<()> {
        self.staged_into("blend_poses", dst, |_, poses, _, scratch| {
            check_weights(sources.len(), weights.len())?;
            if sources.is_empty() {
                return Err(AmberError::NoSourcePoses);
            }
            let target = pose_ref(poses, dst)?;
            for &src in sources {
                check_compatible(target, pose_ref(poses, src)?)?;
            }

            let joint_count = target.transforms.len();
            let mut acc = BlendAccumulator::new(scratch.transforms(joint_count));
            for (&src, &weight) in sources.iter().zip(weights) {
                acc.add(&pose_ref(poses, src)?.transforms, weight);
            }
            acc.finish();
            Ok(joint_count)
        })
    }

    fn compute_additive_pose(
        &mut self,
        src: PoseHandle,
        reference: PoseHandle,
        dst: PoseHandle,
    ) -> AmberResult<()> {
        self.staged_into("compute_additive_pose", dst, |_, poses, _, scratch| {
            let (src, reference) = (pose_ref(poses, src)?, pose_ref(poses, reference)?);
            let target = pose_ref(poses, dst)?;
            check_compatible(target, src)?;
            check_compatible(target, reference)?;
            let out = scratch.transforms(target.transforms.len());
            ops::compute_additive(&src.transforms, &reference.transforms, out);
            Ok(out.len())
        })
    }

    fn apply_additive_poses(
        &mut self,
        base: PoseHandle,
        additives: &[PoseHandle],
        weights: &[f32],
        dst: PoseHandle,
    ) -> AmberResult<()> {
        self.staged_into("apply_additive_poses", dst, |_, poses, _, scratch| {
            check_weights(additives.len(), weights.len())?;
            let base = pose_ref(poses, base)?;
            check_compatible(pose_ref(poses, dst)?, base)?;
            for &additive in additives {
                check_compatible(base, pose_ref(poses, additive)?)?;
            }

            let out = scratch.transforms(base.transforms.len());
            ops::copy(&base.transforms, out);
            for (&additive, &weight) in additives.iter().zip(weights) {
                ops::apply_additive(out, &pose_ref(poses, additive)?.transforms, weight);
            }
            Ok(out.len())
        })
    }

    fn convert_to_world_pose(&mut self, src: PoseHandle, dst: PoseHandle) -> AmberResult<()> {
        self.staged_into("convert_to_world_pose", dst, |armatures, poses, _, scratch| {
            let src = pose_ref(poses, src)?;
            check_compatible(pose_ref(poses, dst)?, src)?;
            let parents = hierarchy_for(armatures, src)?;
            let out = scratch.transforms(src.transforms.len());
            ops::convert_to_world(parents, &src.transforms, out);
            Ok(out.len())
        })
    }

    fn convert_to_local_pose(&mut self, src: PoseHandle, dst: PoseHandle) -> AmberResult<()> {
        self.staged_into("convert_to_local_pose", dst, |armatures, poses, _, scratch| {
            let src = pose_ref(poses, src)?;
            check_compatible(pose_ref(poses, dst)?, src)?;
            let parents = hierarchy_for(armatures, src)?;
            let out = scratch.transforms(src.transforms.len());
            ops::convert_to_local(parents, &src.transforms, out);
            Ok(out.len())
        })
    }
}

/// Parent table of the armature `pose` was built on.
fn hierarchy_for<'a>(armatures: &'a Pool<Armature>, pose: &Pose) -> AmberResult<&'a [i32]> {
    let armature = armature_ref(armatures, pose.armature)?;
    if armature.joint_count() != pose.transforms.len() {
        return Err(AmberError::CountMismatch {
            what: "joint transforms",
            expected: armature.joint_count(),
            found: pose.transforms.len(),
        });
    }
    Ok(armature.joint_parents())
}
