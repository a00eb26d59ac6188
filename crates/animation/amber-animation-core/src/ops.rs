//! Pose kernels over armature-ordered transform slices.
//!
//! These are the state-free passes behind every instance operation. Each one
//! assumes its slices are the same length and come from the same armature; the
//! instance checks that before calling in.
//!
//! Hierarchy passes rely on `parents[i] < i`:
//! - [`convert_to_world`] walks forward and reads the *destination* for the
//!   parent, so [`convert_to_world_in_place`] is the same pass on one buffer.
//! - [`convert_to_local`] walks backward and reads the *source* for the parent,
//!   so source and destination must be distinct buffers.

use crate::armature::ROOT_PARENT;
use crate::math::{
    invert_transform, mul_transform, quat_conjugate, quat_lerp, quat_mul, vec3_div, vec3_lerp,
    vec3_madd, vec3_mul, vec3_sub, Transform,
};

#[inline]
pub fn copy(src: &[Transform], dst: &mut [Transform]) {
    dst.copy_from_slice(src);
}

/// `dst[i] = a[i] * b[i]`
pub fn multiply(a: &[Transform], b: &[Transform], dst: &mut [Transform]) {
    for ((d, a), b) in dst.iter_mut().zip(a).zip(b) {
        *d = mul_transform(a, b);
    }
}

pub fn invert(src: &[Transform], dst: &mut [Transform]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d = invert_transform(s);
    }
}

/// Delta of `src` relative to `reference`, for later use with [`apply_additive`].
pub fn compute_additive(src: &[Transform], reference: &[Transform], dst: &mut [Transform]) {
    for ((d, s), r) in dst.iter_mut().zip(src).zip(reference) {
        d.position = vec3_sub(s.position, r.position);
        d.rotation = quat_mul(quat_conjugate(r.rotation), s.rotation);
        d.scale = vec3_div(s.scale, r.scale);
    }
}

/// Layer `additive` onto `dst` in place with `weight`.
///
/// Rotation and scale interpolate between "no additive" and "full additive" by
/// weight; rotation uses the normalized component lerp.
pub fn apply_additive(dst: &mut [Transform], additive: &[Transform], weight: f32) {
    if weight == 0.0 {
        return;
    }
    for (d, a) in dst.iter_mut().zip(additive) {
        d.position = vec3_madd(d.position, a.position, weight);
        d.rotation = quat_lerp(d.rotation, quat_mul(d.rotation, a.rotation), weight);
        d.scale = vec3_lerp(d.scale, vec3_mul(d.scale, a.scale), weight);
    }
}

/// Local to world, forward pass. Roots copy through.
pub fn convert_to_world(parents: &[i32], src: &[Transform], dst: &mut [Transform]) {
    for (i, &parent) in parents.iter().enumerate() {
        debug_assert!(parent < i as i32);
        dst[i] = if parent == ROOT_PARENT {
            src[i]
        } else {
            mul_transform(&dst[parent as usize], &src[i])
        };
    }
}

/// [`convert_to_world`] with source and destination being the same buffer.
pub fn convert_to_world_in_place(parents: &[i32], transforms: &mut [Transform]) {
    for (i, &parent) in parents.iter().enumerate() {
        debug_assert!(parent < i as i32);
        if parent != ROOT_PARENT {
            transforms[i] = mul_transform(&transforms[parent as usize], &transforms[i]);
        }
    }
}

/// World to local, backward pass. Roots copy through.
pub fn convert_to_local(parents: &[i32], src: &[Transform], dst: &mut [Transform]) {
    for (i, &parent) in parents.iter().enumerate().rev() {
        debug_assert!(parent < i as i32);
        dst[i] = if parent == ROOT_PARENT {
            src[i]
        } else {
            mul_transform(&invert_transform(&src[parent as usize]), &src[i])
        };
    }
}
