//! Curve evaluation and sequence sampling.
//!
//! Model:
//! - A curve is a time-sorted key list evaluated piecewise-linearly.
//! - Times before the first key hold the first value; times after the last key
//!   hold the last value.
//! - Sampling a sequence resets every joint to identity, then overwrites only the
//!   channels that have a curve. Time is never wrapped here; see `playback`.

use crate::math::{lerp_f32, Transform};
use crate::sequence::{Sequence, SequenceKey};

/// Find the keys bracketing `time`, returning `(i0, i1, local_t)`.
///
/// Edge cases:
/// - `time <= first.time` returns `(0, 0, 0)`.
/// - `time >= last.time` returns `(last, last, 0)`.
/// - A time exactly on an interior key starts the segment at that key, so the
///   key's own value comes back untouched.
fn find_segment(keys: &[SequenceKey], time: f32) -> (usize, usize, f32) {
    let n = keys.len();
    if n == 0 || time <= keys[0].time {
        return (0, 0, 0.0);
    }
    if time >= keys[n - 1].time {
        return (n - 1, n - 1, 0.0);
    }
    // Linear scan from the start.
    for i in 0..(n - 1) {
        let t0 = keys[i].time;
        let t1 = keys[i + 1].time;
        if time < t1 {
            let span = t1 - t0;
            let lt = if span > 0.0 { (time - t0) / span } else { 0.0 };
            return (i, i + 1, lt.clamp(0.0, 1.0));
        }
    }
    (n - 1, n - 1, 0.0)
}

/// Evaluate a curve at `time`; `None` for an empty curve.
pub fn evaluate_curve(keys: &[SequenceKey], time: f32) -> Option<f32> {
    if keys.is_empty() {
        return None;
    }
    let (i0, i1, lt) = find_segment(keys, time);
    if i0 == i1 {
        return Some(keys[i0].value);
    }
    Some(lerp_f32(keys[i0].value, keys[i1].value, lt))
}

/// Sample `sequence` at `time` into `out` (one transform per armature joint).
///
/// Joint indices were range-checked when the sequence was created against the
/// same armature `out` belongs to.
pub fn sample_sequence(sequence: &Sequence, time: f32, out: &mut [Transform]) {
    out.fill(Transform::IDENTITY);
    for (&joint, curves) in sequence.joint_indices().iter().zip(sequence.joint_curves()) {
        let Some(transform) = out.get_mut(joint as usize) else {
            continue;
        };
        for (channel, curve) in curves.channels() {
            if let Some(value) = evaluate_curve(&curve.keys, time) {
                transform.set_channel(channel, value);
            }
        }
    }
}
