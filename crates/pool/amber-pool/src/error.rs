//! Error types for pool operations.

use thiserror::Error;

/// Failures reported by [`Pool`](crate::Pool) mutations.
///
/// Lookups never fail loudly (they return `None`); only `insert` and `remove`
/// report errors, and a `remove` failure always means the caller lost track of
/// its own handles.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    #[error("null handle")]
    NullHandle,
    #[error("pool is empty")]
    Empty,
    #[error("slot index {index} is out of range (capacity {capacity})")]
    OutOfRange { index: u32, capacity: u32 },
    #[error("stale handle for slot {index}: generation {found}, slot is at {current}")]
    StaleGeneration { index: u32, found: u8, current: u8 },
    #[error("slot {index} is already free")]
    AlreadyFree { index: u32 },
    #[error("pool capacity exhausted ({max} elements)")]
    CapacityExceeded { max: u32 },
}
