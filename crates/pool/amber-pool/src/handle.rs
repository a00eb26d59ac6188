//! Packed `(index, generation)` handles.

use std::fmt;

/// Largest number of slots a pool can address (24-bit index).
pub const MAX_ELEMENTS: u32 = 0x00FF_FFFF;
/// Generations roll over after this value, skipping 0.
pub const MAX_GENERATIONS: u8 = 0xFF;

/// Opaque 32-bit handle: upper 24 bits = slot index, lower 8 bits = generation.
///
/// Generation 0 is never handed out, so a zeroed handle never resolves.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PoolHandle(u32);

impl PoolHandle {
    /// Reserved "no object" value.
    pub const NULL: PoolHandle = PoolHandle(0xFFFF_FFFF);

    #[inline]
    pub(crate) fn pack(index: u32, generation: u8) -> Self {
        debug_assert!(index <= MAX_ELEMENTS);
        PoolHandle((index << 8) | generation as u32)
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0 >> 8
    }

    #[inline]
    pub fn generation(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        PoolHandle(raw)
    }

    #[inline]
    pub fn to_raw(self) -> u32 {
        self.0
    }
}

impl Default for PoolHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("PoolHandle(null)")
        } else {
            write!(f, "PoolHandle({}v{})", self.index(), self.generation())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trip() {
        let h = PoolHandle::pack(1234, 7);
        assert_eq!(h.index(), 1234);
        assert_eq!(h.generation(), 7);
        assert_eq!(PoolHandle::from_raw(h.to_raw()), h);
    }

    #[test]
    fn null_decodes_past_the_last_slot() {
        assert!(PoolHandle::default().is_null());
        // Capacity tops out at MAX_ELEMENTS, so slot MAX_ELEMENTS never exists.
        assert_eq!(PoolHandle::NULL.index(), MAX_ELEMENTS);
        assert_eq!(PoolHandle::NULL.generation(), MAX_GENERATIONS);
    }
}
