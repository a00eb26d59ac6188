//! Instance sizing.

use serde::{Deserialize, Serialize};

/// Initial sizes for an [`Instance`](crate::Instance).
///
/// Every value is a starting capacity, not a limit; pools grow by doubling and
/// the scratch buffer grows to the largest armature it has been used with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub armature_capacity: usize,
    pub pose_capacity: usize,
    pub sequence_capacity: usize,
    /// Joint count the scratch buffer is reserved for up front.
    pub scratch_joints: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            armature_capacity: 32,
            pose_capacity: 32,
            sequence_capacity: 32,
            scratch_joints: 64,
        }
    }
}
