//! Public object handles.
//!
//! Each handle is an opaque `u64` wrapping a pool handle. `0` is the null
//! value; values that cannot have come from a pool never resolve.

use amber_pool::PoolHandle;
use serde::{Deserialize, Serialize};

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub const NULL: $name = $name(0);

            #[inline]
            pub fn is_null(self) -> bool {
                self.0 == 0
            }

            #[inline]
            pub(crate) fn pool_handle(self) -> PoolHandle {
                match u32::try_from(self.0) {
                    Ok(raw) if raw != 0 => PoolHandle::from_raw(raw),
                    _ => PoolHandle::NULL,
                }
            }
        }

        impl From<PoolHandle> for $name {
            #[inline]
            fn from(h: PoolHandle) -> Self {
                if h.is_null() {
                    $name::NULL
                } else {
                    $name(h.to_raw() as u64)
                }
            }
        }
    };
}

define_handle!(
    /// Joint hierarchy shared by poses and sequences.
    ArmatureHandle
);
define_handle!(
    /// Buffer of per-joint transforms.
    PoseHandle
);
define_handle!(
    /// Sampled keyframe curves.
    SequenceHandle
);

#[cfg(test)]
mod tests {
    use super::*;
    use amber_pool::Pool;

    #[test]
    fn null_and_oversized_values_map_to_null_pool_handle() {
        assert!(PoseHandle::NULL.pool_handle().is_null());
        assert!(PoseHandle(u64::MAX).pool_handle().is_null());
        assert!(PoseHandle(1 << 40).pool_handle().is_null());
    }

    #[test]
    fn pool_handles_round_trip() {
        let mut pool = Pool::with_capacity(1);
        let raw = pool.insert(()).unwrap();
        let handle = ArmatureHandle::from(raw);
        assert!(!handle.is_null());
        assert_eq!(handle.pool_handle(), raw);
        assert_eq!(ArmatureHandle::from(PoolHandle::NULL), ArmatureHandle::NULL);
    }
}
