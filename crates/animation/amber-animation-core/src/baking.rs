//! Baking: sample a sequence at a fixed rate into a dense list of local poses.

use serde::{Deserialize, Serialize};

use crate::error::{AmberError, AmberResult};
use crate::math::Transform;
use crate::sampling::sample_sequence;
use crate::sequence::Sequence;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BakingConfig {
    /// Target frame rate (Hz) for baked frames.
    pub frame_rate: f32,
    /// Window start; if None, the sequence's first key time.
    pub start_time: Option<f32>,
    /// Window end; if None, the sequence's last key time.
    pub end_time: Option<f32>,
    /// Upper bound on the number of frames one bake may produce.
    pub max_frames: usize,
}

impl Default for BakingConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            start_time: None,
            end_time: None,
            max_frames: 1 << 20,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedPoses {
    pub frame_rate: f32,
    pub start_time: f32,
    pub end_time: f32,
    /// One local pose per frame, each with one transform per armature joint.
    pub frames: Vec<Vec<Transform>>,
}

impl BakedPoses {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Bake `sequence` for an armature of `joint_count` joints.
///
/// The window is clamped to the sequence's time range and includes both ends,
/// so the last frame always lands on `end_time`. A window that would need more
/// than `cfg.max_frames` frames is refused before anything is allocated.
pub fn bake_sequence(
    sequence: &Sequence,
    joint_count: usize,
    cfg: &BakingConfig,
) -> AmberResult<BakedPoses> {
    let sr = if cfg.frame_rate.is_finite() && cfg.frame_rate > 0.0 {
        cfg.frame_rate
    } else {
        60.0
    };
    let (min_time, max_time) = sequence.time_range();
    let start = cfg
        .start_time
        .filter(|t| t.is_finite())
        .unwrap_or(min_time)
        .clamp(min_time, max_time);
    let end = cfg
        .end_time
        .filter(|t| t.is_finite())
        .unwrap_or(max_time)
        .clamp(start, max_time);
    // f64 keeps the span finite for any pair of finite f32 endpoints.
    let span = f64::from(end) - f64::from(start);
    let frames_needed = (span * f64::from(sr)).ceil() + 1.0;
    if frames_needed > cfg.max_frames as f64 {
        return Err(AmberError::CountMismatch {
            what: "baked frames",
            expected: cfg.max_frames,
            // Saturating cast.
            found: frames_needed as usize,
        });
    }
    let frame_count = frames_needed as usize;

    let mut frames = Vec::with_capacity(frame_count);
    for f in 0..frame_count {
        let t = (start + f as f32 / sr).min(end);
        let mut pose = vec![Transform::IDENTITY; joint_count];
        sample_sequence(sequence, t, &mut pose);
        frames.push(pose);
    }

    Ok(BakedPoses {
        frame_rate: sr,
        start_time: start,
        end_time: end,
        frames,
    })
}

/// Export baked data as serde_json::Value (stable schema for serialization).
pub fn export_baked_json(baked: &BakedPoses) -> serde_json::Value {
    serde_json::to_value(baked).unwrap_or(serde_json::Value::Null)
}
