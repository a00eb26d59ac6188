//! Mapping a free-running clock onto a sequence's time range.
//!
//! `sample_pose` evaluates curves at exactly the time it is given. Callers that
//! drive sequences from a wall clock resolve that clock here first.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Hold the first/last frame outside the range.
    #[default]
    Once,
    Loop,
    PingPong,
}

fn fmod(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if (m < 0.0 && b > 0.0) || (m > 0.0 && b < 0.0) {
        m + b
    } else {
        m
    }
}

/// Reflect t into [0, span], where one full back-and-forth is 2 * span.
fn ping_pong(t: f32, span: f32) -> f32 {
    if span <= 0.0 {
        return 0.0;
    }
    let period = 2.0 * span;
    let m = fmod(t, period);
    if m <= span {
        m
    } else {
        period - m
    }
}

/// Resolve `time` into `range` (as returned by `sequence_time_range`).
///
/// Empty or degenerate ranges resolve to their start.
pub fn resolve_time(range: (f32, f32), time: f32, mode: LoopMode) -> f32 {
    let (start, end) = range;
    let span = end - start;
    if !time.is_finite() || span <= 0.0 {
        return start;
    }
    match mode {
        LoopMode::Once => time.clamp(start, end),
        LoopMode::Loop => start + fmod(time - start, span),
        LoopMode::PingPong => start + ping_pong(time - start, span),
    }
}
