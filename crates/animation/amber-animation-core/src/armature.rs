//! Armature store: joint hierarchy metadata.
//!
//! Joints are kept in parent-before-child order (`parents[i] < i`), which lets
//! every hierarchy walk run as a single forward or backward pass.

use serde::{Deserialize, Serialize};

use crate::error::{AmberError, AmberResult};

/// Parent index of a root joint.
pub const ROOT_PARENT: i32 = -1;

/// Caller-supplied armature description; the store copies what it needs.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ArmatureDesc {
    pub joint_parents: Vec<i32>,
    #[serde(default)]
    pub joint_names: Option<Vec<String>>,
}

impl ArmatureDesc {
    #[inline]
    pub fn joint_count(&self) -> usize {
        self.joint_parents.len()
    }

    /// Check the hierarchy invariants without allocating anything.
    pub fn validate(&self) -> AmberResult<()> {
        if self.joint_parents.is_empty() {
            return Err(AmberError::EmptyArmature);
        }
        if self.joint_parents.len() > i32::MAX as usize {
            return Err(AmberError::CountMismatch {
                what: "joints at most",
                expected: i32::MAX as usize,
                found: self.joint_parents.len(),
            });
        }
        for (i, &parent) in self.joint_parents.iter().enumerate() {
            if parent < ROOT_PARENT || parent >= i as i32 {
                return Err(AmberError::InvalidHierarchy {
                    joint: i as u32,
                    parent,
                });
            }
        }
        if let Some(names) = &self.joint_names {
            if names.len() != self.joint_parents.len() {
                return Err(AmberError::CountMismatch {
                    what: "joint names",
                    expected: self.joint_parents.len(),
                    found: names.len(),
                });
            }
            if let Some(joint) = names.iter().position(|n| n.as_bytes().contains(&0)) {
                return Err(AmberError::InvalidJointName {
                    joint: joint as u32,
                });
            }
        }
        Ok(())
    }
}

/// Joint names packed into one NUL-terminated block plus a start offset per joint.
#[derive(Clone, Debug, Default)]
pub struct JointNames {
    memory: Vec<u8>,
    offsets: Vec<u32>,
}

impl JointNames {
    pub fn pack<S: AsRef<str>>(names: &[S]) -> Self {
        let total: usize = names.iter().map(|n| n.as_ref().len() + 1).sum();
        let mut memory = Vec::with_capacity(total);
        let mut offsets = Vec::with_capacity(names.len());
        for name in names {
            offsets.push(memory.len() as u32);
            memory.extend_from_slice(name.as_ref().as_bytes());
            memory.push(0);
        }
        Self { memory, offsets }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn get(&self, joint: usize) -> Option<&str> {
        let start = *self.offsets.get(joint)? as usize;
        let end = self
            .offsets
            .get(joint + 1)
            .map_or(self.memory.len(), |&next| next as usize);
        // Drop the terminator.
        std::str::from_utf8(&self.memory[start..end - 1]).ok()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        (0..self.len()).find(|&i| self.get(i) == Some(name))
    }

    /// The packed block, terminators included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.memory
    }
}

#[derive(Clone, Debug)]
pub struct Armature {
    joint_parents: Vec<i32>,
    joint_names: Option<JointNames>,
}

impl Armature {
    pub fn from_desc(desc: &ArmatureDesc) -> AmberResult<Self> {
        desc.validate()?;
        Ok(Self {
            joint_parents: desc.joint_parents.clone(),
            joint_names: desc.joint_names.as_deref().map(JointNames::pack),
        })
    }

    #[inline]
    pub fn joint_count(&self) -> usize {
        self.joint_parents.len()
    }

    #[inline]
    pub fn joint_parents(&self) -> &[i32] {
        &self.joint_parents
    }

    #[inline]
    pub fn joint_names(&self) -> Option<&JointNames> {
        self.joint_names.as_ref()
    }

    pub fn joint_name(&self, joint: usize) -> Option<&str> {
        self.joint_names.as_ref()?.get(joint)
    }

    pub fn find_joint(&self, name: &str) -> Option<usize> {
        self.joint_names.as_ref()?.position(name)
    }
}
