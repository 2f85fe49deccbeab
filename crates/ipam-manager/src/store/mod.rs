//! Pool storage trait and implementations
//!
//! The engine talks to storage only through [`PoolStore`]; backends do no
//! validation of their own.

mod file;
mod memory;

pub use file::JsonFilePoolStore;
pub use memory::InMemoryPoolStore;

use crate::models::{NewPool, Pool, PoolId, PoolPatch};
use crate::Result;
use async_trait::async_trait;

/// Abstract pool storage interface
#[async_trait]
pub trait PoolStore: Send + Sync {
    /// List every pool
    async fn list_pools(&self) -> Result<Vec<Pool>>;

    /// Get a pool by ID
    async fn get_pool(&self, id: PoolId) -> Result<Option<Pool>>;

    /// Insert a pool as given, assigning its ID and timestamps
    async fn insert_pool(&self, input: NewPool) -> Result<Pool>;

    /// Apply a patch; `None` if the pool does not exist
    async fn update_pool(&self, id: PoolId, patch: &PoolPatch) -> Result<Option<Pool>>;

    /// Remove a single pool; `false` if it did not exist
    async fn delete_pool(&self, id: PoolId) -> Result<bool>;

    /// Remove several pools as one unit
    ///
    /// Either every ID is removed or none is. Fails with `NotFound` if any
    /// ID is missing.
    async fn delete_pools(&self, ids: &[PoolId]) -> Result<usize>;

    /// Pools whose parent is `parent_id`
    async fn list_children(&self, parent_id: Option<PoolId>) -> Result<Vec<Pool>> {
        Ok(self
            .list_pools()
            .await?
            .into_iter()
            .filter(|p| p.parent_id == parent_id)
            .collect())
    }
}
