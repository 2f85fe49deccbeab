//! Derived views: utilization stats, hierarchy nodes and block listings

use super::pool::{Pool, PoolId};
use serde::{Deserialize, Serialize};

/// Address-count statistics for a pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Usable hosts in the pool's own CIDR
    pub total: u64,
    /// Usable hosts claimed by counted children
    pub allocated: u64,
    /// `total - allocated`
    pub free: u64,
    /// Utilization percentage (0.0 - 100.0)
    pub utilization_percent: f64,
    /// Number of children counted
    pub child_count: usize,
}

/// A pool with its stats and nested children, for hierarchy rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolWithStats {
    #[serde(flatten)]
    pub pool: Pool,
    pub stats: PoolStats,
    pub children: Vec<PoolWithStats>,
}

/// Allocation status of a candidate block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BlockStatus {
    /// No direct child touches this block
    Free,
    /// Exactly matches a direct child
    Used {
        pool_id: PoolId,
        pool_name: String,
        account_id: Option<i64>,
    },
    /// Overlaps a direct child with a different CIDR
    ExistsElsewhere { pool_id: PoolId, pool_cidr: String },
}

impl BlockStatus {
    pub fn is_free(&self) -> bool {
        matches!(self, BlockStatus::Free)
    }
}

/// A candidate sub-block and its status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub cidr: String,
    pub hosts: u64,
    #[serde(flatten)]
    pub status: BlockStatus,
}
