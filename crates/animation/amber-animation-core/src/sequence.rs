//! Sequence store: per-joint keyframe curves.
//!
//! Every animated joint carries ten scalar curves (3 position, 4 rotation,
//! 3 scale). Rotation components are independent curves; their sampled values
//! are written as-is with no renormalization.

use serde::{Deserialize, Serialize};

use crate::error::{AmberError, AmberResult};
use crate::handles::ArmatureHandle;
use crate::math::{Transform, Vec2};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceKey {
    pub time: f32,
    pub value: f32,
    /// Carried for authoring tools; evaluation is piecewise-linear.
    #[serde(default)]
    pub tangent_left: Vec2,
    #[serde(default)]
    pub tangent_right: Vec2,
}

impl SequenceKey {
    #[inline]
    pub const fn linear(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            tangent_left: Vec2 { x: 0.0, y: 0.0 },
            tangent_right: Vec2 { x: 0.0, y: 0.0 },
        }
    }
}

/// Keys sorted by time. An empty curve leaves its channel untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceCurve {
    pub keys: Vec<SequenceKey>,
}

impl SequenceCurve {
    pub fn new(keys: Vec<SequenceKey>) -> Self {
        Self { keys }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// `(first, last)` key times.
    pub fn time_range(&self) -> Option<(f32, f32)> {
        Some((self.keys.first()?.time, self.keys.last()?.time))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointCurves {
    #[serde(default)]
    pub position: [SequenceCurve; 3],
    #[serde(default)]
    pub rotation: [SequenceCurve; 4],
    #[serde(default)]
    pub scale: [SequenceCurve; 3],
}

/// One of the ten scalar channels of a joint transform.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Channel {
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
    RotationW,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl Channel {
    pub const ALL: [Channel; 10] = [
        Channel::PositionX,
        Channel::PositionY,
        Channel::PositionZ,
        Channel::RotationX,
        Channel::RotationY,
        Channel::RotationZ,
        Channel::RotationW,
        Channel::ScaleX,
        Channel::ScaleY,
        Channel::ScaleZ,
    ];
}

impl Transform {
    /// Overwrite the component `channel` drives.
    #[inline]
    pub fn set_channel(&mut self, channel: Channel, value: f32) {
        match channel {
            Channel::PositionX => self.position.x = value,
            Channel::PositionY => self.position.y = value,
            Channel::PositionZ => self.position.z = value,
            Channel::RotationX => self.rotation.x = value,
            Channel::RotationY => self.rotation.y = value,
            Channel::RotationZ => self.rotation.z = value,
            Channel::RotationW => self.rotation.w = value,
            Channel::ScaleX => self.scale.x = value,
            Channel::ScaleY => self.scale.y = value,
            Channel::ScaleZ => self.scale.z = value,
        }
    }
}

impl JointCurves {
    pub fn curve(&self, channel: Channel) -> &SequenceCurve {
        match channel {
            Channel::PositionX => &self.position[0],
            Channel::PositionY => &self.position[1],
            Channel::PositionZ => &self.position[2],
            Channel::RotationX => &self.rotation[0],
            Channel::RotationY => &self.rotation[1],
            Channel::RotationZ => &self.rotation[2],
            Channel::RotationW => &self.rotation[3],
            Channel::ScaleX => &self.scale[0],
            Channel::ScaleY => &self.scale[1],
            Channel::ScaleZ => &self.scale[2],
        }
    }

    fn curve_mut(&mut self, channel: Channel) -> &mut SequenceCurve {
        match channel {
            Channel::PositionX => &mut self.position[0],
            Channel::PositionY => &mut self.position[1],
            Channel::PositionZ => &mut self.position[2],
            Channel::RotationX => &mut self.rotation[0],
            Channel::RotationY => &mut self.rotation[1],
            Channel::RotationZ => &mut self.rotation[2],
            Channel::RotationW => &mut self.rotation[3],
            Channel::ScaleX => &mut self.scale[0],
            Channel::ScaleY => &mut self.scale[1],
            Channel::ScaleZ => &mut self.scale[2],
        }
    }

    /// Non-empty curves with their channel.
    pub fn channels(&self) -> impl Iterator<Item = (Channel, &SequenceCurve)> {
        Channel::ALL
            .into_iter()
            .map(move |c| (c, self.curve(c)))
            .filter(|(_, curve)| !curve.is_empty())
    }

    /// Set one channel, returning `self` for chained construction.
    pub fn with(mut self, channel: Channel, keys: Vec<SequenceKey>) -> Self {
        *self.curve_mut(channel) = SequenceCurve::new(keys);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceDesc {
    #[serde(default)]
    pub armature: ArmatureHandle,
    /// Armature joints animated by this sequence, parallel to `joint_curves`.
    pub joint_indices: Vec<u32>,
    pub joint_curves: Vec<JointCurves>,
}

#[derive(Clone, Debug)]
pub struct Sequence {
    armature: ArmatureHandle,
    joint_indices: Vec<u32>,
    joint_curves: Vec<JointCurves>,
    min_time: f32,
    max_time: f32,
}

impl Sequence {
    /// Deep-copy the non-empty curves of `desc` and cache the overall key range.
    pub fn from_desc(desc: &SequenceDesc, armature_joint_count: usize) -> AmberResult<Self> {
        if desc.joint_indices.len() != desc.joint_curves.len() {
            return Err(AmberError::CountMismatch {
                what: "joint curve bundles",
                expected: desc.joint_indices.len(),
                found: desc.joint_curves.len(),
            });
        }

        let mut min_time = f32::INFINITY;
        let mut max_time = f32::NEG_INFINITY;
        let mut joint_curves = Vec::with_capacity(desc.joint_curves.len());

        for (&joint, bundle) in desc.joint_indices.iter().zip(&desc.joint_curves) {
            if joint as usize >= armature_joint_count {
                return Err(AmberError::JointOutOfRange {
                    joint,
                    joint_count: armature_joint_count as u32,
                });
            }

            let mut copied = JointCurves::default();
            for (channel, curve) in bundle.channels() {
                validate_keys(joint, channel, &curve.keys)?;
                if let Some((first, last)) = curve.time_range() {
                    min_time = min_time.min(first);
                    max_time = max_time.max(last);
                }
                *copied.curve_mut(channel) = curve.clone();
            }
            joint_curves.push(copied);
        }

        if min_time > max_time {
            min_time = 0.0;
            max_time = 0.0;
        }

        Ok(Self {
            armature: desc.armature,
            joint_indices: desc.joint_indices.clone(),
            joint_curves,
            min_time,
            max_time,
        })
    }

    #[inline]
    pub fn armature(&self) -> ArmatureHandle {
        self.armature
    }

    #[inline]
    pub fn joint_indices(&self) -> &[u32] {
        &self.joint_indices
    }

    #[inline]
    pub fn joint_curves(&self) -> &[JointCurves] {
        &self.joint_curves
    }

    /// `(min_time, max_time)` over every key of every curve; `(0, 0)` when there are none.
    #[inline]
    pub fn time_range(&self) -> (f32, f32) {
        (self.min_time, self.max_time)
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.max_time - self.min_time
    }
}

fn validate_keys(joint: u32, channel: Channel, keys: &[SequenceKey]) -> AmberResult<()> {
    let mut last = f32::NEG_INFINITY;
    for key in keys {
        if !key.time.is_finite() {
            return Err(AmberError::InvalidCurve {
                joint,
                channel,
                reason: "key time is not finite",
            });
        }
        if key.time < last {
            return Err(AmberError::InvalidCurve {
                joint,
                channel,
                reason: "key times must be non-decreasing",
            });
        }
        last = key.time;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pairs: &[(f32, f32)]) -> Vec<SequenceKey> {
        pairs
            .iter()
            .map(|&(t, v)| SequenceKey::linear(t, v))
            .collect()
    }

    #[test]
    fn caches_range_across_all_curves() {
        let desc = SequenceDesc {
            armature: ArmatureHandle(1),
            joint_indices: vec![0, 2],
            joint_curves: vec![
                JointCurves::default().with(Channel::PositionY, keys(&[(0.5, 0.0), (1.0, 1.0)])),
                JointCurves::default()
                    .with(Channel::RotationW, keys(&[(-0.25, 1.0)]))
                    .with(Channel::ScaleX, keys(&[(0.0, 1.0), (3.0, 2.0)])),
            ],
        };
        let seq = Sequence::from_desc(&desc, 3).unwrap();
        assert_eq!(seq.time_range(), (-0.25, 3.0));
        assert_eq!(seq.duration(), 3.25);
        assert_eq!(seq.joint_curves()[1].channels().count(), 2);
    }

    #[test]
    fn keyless_sequence_has_empty_range() {
        let desc = SequenceDesc {
            armature: ArmatureHandle(1),
            joint_indices: vec![0],
            joint_curves: vec![JointCurves::default()],
        };
        let seq = Sequence::from_desc(&desc, 1).unwrap();
        assert_eq!(seq.time_range(), (0.0, 0.0));
    }

    #[test]
    fn rejects_shape_errors() {
        let mut desc = SequenceDesc {
            armature: ArmatureHandle(1),
            joint_indices: vec![0, 1],
            joint_curves: vec![JointCurves::default()],
        };
        assert!(matches!(
            Sequence::from_desc(&desc, 4),
            Err(AmberError::CountMismatch { .. })
        ));

        desc.joint_indices = vec![4];
        assert_eq!(
            Sequence::from_desc(&desc, 4).unwrap_err(),
            AmberError::JointOutOfRange {
                joint: 4,
                joint_count: 4
            }
        );

        desc.joint_indices = vec![0];
        desc.joint_curves =
            vec![JointCurves::default().with(Channel::ScaleZ, keys(&[(1.0, 0.0), (0.5, 1.0)]))];
        assert!(matches!(
            Sequence::from_desc(&desc, 4),
            Err(AmberError::InvalidCurve {
                joint: 0,
                channel: Channel::ScaleZ,
                ..
            })
        ));
    }

    #[test]
    fn curves_parse_from_plain_key_arrays() {
        let json = r#"{
            "joint_indices": [1],
            "joint_curves": [{
                "position": [[], [{"time": 0.0, "value": 1.0}], []]
            }]
        }"#;
        let desc: SequenceDesc = serde_json::from_str(json).unwrap();
        assert!(desc.armature.is_null());
        assert_eq!(desc.joint_curves[0].position[1].keys.len(), 1);
        assert!(desc.joint_curves[0].rotation.iter().all(SequenceCurve::is_empty));
    }
}
