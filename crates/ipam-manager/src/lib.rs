//! IPv4 Pool Manager
//!
//! Hierarchical IP address pools with validated sub-allocation:
//! - Containment of every pool in its parent
//! - No overlap among pools sharing a parent
//! - Hierarchy trees annotated with utilization
//! - Windowed enumeration of candidate sub-blocks over any range size
//! - Cascading subtree deletion
//!
//! Features:
//! - Pluggable async storage (`PoolStore`), in-memory and JSON-file backends
//! - Per-scope locking for concurrent creates
//! - REST API and `ipam-server` binary
//!
//! IPv4 only.

pub mod api;
pub mod blocks;
pub mod cascade;
pub mod cidr;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod service;
pub mod store;
pub mod utilization;
pub mod validate;

// Re-exports
pub use blocks::{compute_subnets_window, SubnetWindow};
pub use error::{Error, Result};
pub use models::{
    BlockInfo, BlockStatus, NewPool, Pool, PoolId, PoolPatch, PoolStats, PoolStatus, PoolType,
    PoolWithStats,
};
pub use service::{BlockListing, PoolManager, PoolManagerConfig};
pub use store::{InMemoryPoolStore, JsonFilePoolStore, PoolStore};
pub use api::{create_router, start_server, ApiServerConfig, AppState};
