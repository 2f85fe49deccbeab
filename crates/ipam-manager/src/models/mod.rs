//! Data models for pool management

mod pool;
mod stats;

pub use pool::{NewPool, Pool, PoolId, PoolPatch, PoolStatus, PoolType};
pub use stats::{BlockInfo, BlockStatus, PoolStats, PoolWithStats};
