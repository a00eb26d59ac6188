//! Weighted accumulation of poses into a single blended pose.
//!
//! The accumulator keeps a running weighted sum per joint:
//! - position and scale: plain component sums
//! - rotation: quaternion sum with hemisphere correction against the running
//!   sum, renormalized once at `finish`
//!
//! Weights are not normalized; a set of weights summing to 0.5 yields half-size
//! positions and scales.

use crate::math::{quat_madd_hemisphere, quat_normalize, vec3_madd, Transform};

pub struct BlendAccumulator<'a> {
    out: &'a mut [Transform],
    contributions: usize,
}

impl<'a> BlendAccumulator<'a> {
    /// Zero `out` and start a new sum.
    pub fn new(out: &'a mut [Transform]) -> Self {
        out.fill(Transform::ZERO);
        Self {
            out,
            contributions: 0,
        }
    }

    /// Fold `src * weight` into the sum. Zero weights are skipped.
    pub fn add(&mut self, src: &[Transform], weight: f32) {
        debug_assert_eq!(src.len(), self.out.len());
        if weight == 0.0 {
            return;
        }
        for (dst, src) in self.out.iter_mut().zip(src) {
            dst.position = vec3_madd(dst.position, src.position, weight);
            dst.rotation = quat_madd_hemisphere(dst.rotation, src.rotation, weight);
            dst.scale = vec3_madd(dst.scale, src.scale, weight);
        }
        self.contributions += 1;
    }

    #[inline]
    pub fn contributions(&self) -> usize {
        self.contributions
    }

    /// Renormalize every accumulated rotation.
    pub fn finish(self) -> usize {
        for t in self.out.iter_mut() {
            t.rotation = quat_normalize(t.rotation);
        }
        self.contributions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{quat_dot, Quat, Vec3};

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-5, "left={a} right={b}");
    }

    #[test]
    fn single_unit_weight_reproduces_source() {
        let src = [Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            quat_normalize(Quat::new(0.1, 0.2, 0.3, 0.9)),
            Vec3::new(1.0, 2.0, 1.0),
        )];
        let mut out = [Transform::IDENTITY];
        let mut acc = BlendAccumulator::new(&mut out);
        acc.add(&src, 1.0);
        assert_eq!(acc.finish(), 1);
        assert_eq!(out[0].position, src[0].position);
        assert_eq!(out[0].scale, src[0].scale);
        approx(quat_dot(out[0].rotation, src[0].rotation), 1.0);
    }

    #[test]
    fn weights_are_summed_not_averaged() {
        let a = [Transform::from_position(Vec3::new(2.0, 0.0, 0.0))];
        let b = [Transform::from_position(Vec3::new(0.0, 4.0, 0.0))];
        let mut out = [Transform::IDENTITY];
        let mut acc = BlendAccumulator::new(&mut out);
        acc.add(&a, 0.25);
        acc.add(&b, 0.25);
        acc.add(&b, 0.0);
        assert_eq!(acc.contributions(), 2);
        acc.finish();
        assert_eq!(out[0].position, Vec3::new(0.5, 1.0, 0.0));
        assert_eq!(out[0].scale, Vec3::new(0.5, 0.5, 0.5));
        assert_eq!(out[0].rotation, Quat::IDENTITY);
    }

    #[test]
    fn opposite_hemisphere_samples_do_not_cancel() {
        let q = quat_normalize(Quat::new(0.0, 0.3, 0.0, 0.95));
        let a = [Transform::from_rotation(q)];
        let b = [Transform::from_rotation(Quat::new(-q.x, -q.y, -q.z, -q.w))];
        let mut out = [Transform::IDENTITY];
        let mut acc = BlendAccumulator::new(&mut out);
        acc.add(&a, 0.5);
        acc.add(&b, 0.5);
        acc.finish();
        // Same rotation either way; the sum must not collapse to zero.
        approx(quat_dot(out[0].rotation, q).abs(), 1.0);
    }
}
