//! amber-pool: generation-tagged slot allocator.
//!
//! Every Amber object (armature, pose, sequence) lives in a [`Pool`] slot and is
//! identified by a [`PoolHandle`]. Handles carry an 8-bit generation so a
//! handle captured before a removal stops resolving once its slot is reused.

pub mod error;
pub mod handle;
pub mod pool;

pub use error::PoolError;
pub use handle::{PoolHandle, MAX_ELEMENTS, MAX_GENERATIONS};
pub use pool::{Drain, Iter, Pool};
