//! Error and result-code types.

use amber_pool::PoolError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an operation was refused. Nothing is written to any output when one of
/// these is returned.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum AmberError {
    #[error("invalid {kind} handle {handle:#x}")]
    InvalidHandle { kind: &'static str, handle: u64 },

    #[error("armature has no joints")]
    EmptyArmature,

    #[error("joint {joint} has parent {parent}; parents must precede their children")]
    InvalidHierarchy { joint: u32, parent: i32 },

    #[error("joint name {joint} contains a NUL byte")]
    InvalidJointName { joint: u32 },

    #[error("expected {expected} {what}, got {found}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("poses reference different armatures ({expected:#x} vs {found:#x})")]
    ArmatureMismatch { expected: u64, found: u64 },

    #[error("joint index {joint} is outside the armature ({joint_count} joints)")]
    JointOutOfRange { joint: u32, joint_count: u32 },

    #[error("curve {channel:?} of joint {joint}: {reason}")]
    InvalidCurve {
        joint: u32,
        channel: crate::sequence::Channel,
        reason: &'static str,
    },

    #[error("at least one source pose is required")]
    NoSourcePoses,

    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl AmberError {
    /// Short category name for logs.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidHandle { .. } => "handle",
            Self::EmptyArmature | Self::InvalidHierarchy { .. } | Self::InvalidJointName { .. } => {
                "armature"
            }
            Self::CountMismatch { .. } => "arguments",
            Self::ArmatureMismatch { .. } | Self::JointOutOfRange { .. } => "armature-mismatch",
            Self::InvalidCurve { .. } => "curve",
            Self::NoSourcePoses => "arguments",
            Self::Pool(_) => "pool",
        }
    }
}

pub type AmberResult<T> = Result<T, AmberError>;

/// Flat status codes for foreign front ends.
#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    Success = 0,
    /// Reserved for front ends that stub out an operation in a given build.
    NotImplemented,
    /// Produced by front ends that hand out instance handles.
    InvalidInstance,
    /// Produced by front ends that write results through caller pointers.
    InvalidOutputArgument,
    InternalError,
}

/// Every core error is caller misuse and reports as `InternalError`.
impl From<&AmberError> for ResultCode {
    fn from(_: &AmberError) -> Self {
        ResultCode::InternalError
    }
}

impl<T> From<&AmberResult<T>> for ResultCode {
    fn from(res: &AmberResult<T>) -> Self {
        match res {
            Ok(_) => ResultCode::Success,
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_violations_map_to_internal_error() {
        let err = AmberError::ArmatureMismatch {
            expected: 1,
            found: 2,
        };
        assert_eq!(ResultCode::from(&err), ResultCode::InternalError);

        let pool: AmberError = PoolError::NullHandle.into();
        assert_eq!(ResultCode::from(&pool), ResultCode::InternalError);
    }

    #[test]
    fn results_map_to_codes() {
        let res: AmberResult<()> = Err(AmberError::NoSourcePoses);
        assert_eq!(ResultCode::from(&res), ResultCode::InternalError);
        assert_eq!(ResultCode::from(&Ok::<_, AmberError>(3)), ResultCode::Success);
    }
}
