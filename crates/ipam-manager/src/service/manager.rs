//! Pool Manager Service
//!
//! Engine facade over a [`PoolStore`], providing:
//! - Validated pool creation (containment, uniqueness, per-parent overlap)
//! - Plain and cascading deletion
//! - Hierarchy, utilization and block-listing views

use super::locks::ScopeLocks;
use crate::blocks::{classify_blocks, first_free_block, window_of};
use crate::cascade::collect_subtree;
use crate::cidr::parse_prefix;
use crate::hierarchy::{build_hierarchy, node_count};
use crate::models::{BlockInfo, NewPool, Pool, PoolId, PoolPatch, PoolStats, PoolWithStats};
use crate::store::{InMemoryPoolStore, PoolStore};
use crate::utilization;
use crate::validate::{siblings_of, validate_child_cidr, validate_no_overlap, validate_unique_cidr};
use crate::{Error, Result};
use ipnet::Ipv4Net;
use serde::Serialize;
use std::sync::Arc;

/// Configuration for PoolManager
#[derive(Debug, Clone)]
pub struct PoolManagerConfig {
    /// Blocks returned by `list_blocks` when no limit is given
    pub default_block_limit: usize,
    /// Upper bound on blocks returned by one `list_blocks` call
    pub max_block_limit: usize,
}

impl Default for PoolManagerConfig {
    fn default() -> Self {
        Self {
            default_block_limit: 256,
            max_block_limit: 4096,
        }
    }
}

/// One page of candidate sub-blocks of a pool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockListing {
    pub pool_id: PoolId,
    pub pool_cidr: String,
    pub prefix_len: u8,
    pub total_blocks: u64,
    pub hosts_per_block: u64,
    pub offset: u64,
    pub limit: u64,
    pub blocks: Vec<BlockInfo>,
}

impl BlockListing {
    /// Number of free blocks in this page
    pub fn free_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.status.is_free()).count()
    }
}

/// Pool Manager - validates and applies pool mutations
pub struct PoolManager {
    /// Configuration
    config: PoolManagerConfig,
    /// Backing store
    store: Arc<dyn PoolStore>,
    /// Mutation locks
    locks: ScopeLocks,
}

impl PoolManager {
    /// Create a manager over `store` with default configuration
    pub fn new(store: Arc<dyn PoolStore>) -> Self {
        Self::with_config(store, PoolManagerConfig::default())
    }

    /// Create a manager over `store` with custom configuration
    pub fn with_config(store: Arc<dyn PoolStore>, config: PoolManagerConfig) -> Self {
        Self {
            config,
            store,
            locks: ScopeLocks::new(),
        }
    }

    /// Manager over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryPoolStore::new()))
    }

    pub fn config(&self) -> &PoolManagerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn PoolStore> {
        &self.store
    }

    // ==================== Mutations ====================

    /// Create a pool after validating it against its parent and siblings
    ///
    /// The CIDR is stored in canonical form. All checks run before the
    /// insert; a rejected create leaves the store unchanged.
    pub async fn create_pool(&self, input: NewPool) -> Result<Pool> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidArgument("pool name must not be empty".to_string()));
        }
        let net = parse_prefix(&input.cidr)?;

        let _guard = self.locks.lock_scope(input.parent_id).await;
        let pools = self.store.list_pools().await?;

        if let Some(parent_id) = input.parent_id {
            let parent = pools
                .iter()
                .find(|p| p.id == parent_id)
                .ok_or(Error::ParentNotFound(parent_id))?;
            let parent_net = stored_prefix(parent)?;
            validate_child_cidr(&parent_net, &net).map_err(|e| rejected(&net, e))?;
        }

        let siblings: Vec<&Pool> = siblings_of(&pools, input.parent_id).collect();
        validate_unique_cidr(&net, siblings.iter().copied())
            .and_then(|_| validate_no_overlap(&net, siblings.iter().copied()))
            .map_err(|e| rejected(&net, e))?;

        let pool = self
            .store
            .insert_pool(NewPool {
                name,
                cidr: net.to_string(),
                ..input
            })
            .await?;

        tracing::info!(
            pool_id = %pool.id,
            name = %pool.name,
            cidr = %pool.cidr,
            parent_id = ?pool.parent_id,
            "Created pool"
        );

        Ok(pool)
    }

    /// Apply a patch to a pool's descriptive fields
    ///
    /// Returns `None` if the pool does not exist.
    pub async fn update_pool(&self, id: PoolId, mut patch: PoolPatch) -> Result<Option<Pool>> {
        if let Some(name) = patch.name.as_mut() {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(Error::InvalidArgument("pool name must not be empty".to_string()));
            }
            *name = trimmed.to_string();
        }

        let _guard = self.locks.shared().await;
        if patch.is_empty() {
            return self.store.get_pool(id).await;
        }

        let updated = self.store.update_pool(id, &patch).await?;
        if let Some(pool) = &updated {
            tracing::info!(pool_id = %pool.id, name = %pool.name, "Updated pool");
        }
        Ok(updated)
    }

    /// Delete a pool that has no children
    ///
    /// `Ok(false)` if the pool does not exist, `Error::Conflict` if it still
    /// has children.
    pub async fn delete_pool(&self, id: PoolId) -> Result<bool> {
        let _guard = self.locks.exclusive().await;

        if self.store.get_pool(id).await?.is_none() {
            return Ok(false);
        }

        let children = self.store.list_children(Some(id)).await?.len();
        if children > 0 {
            tracing::warn!(pool_id = %id, children, "Refused to delete pool with children");
            return Err(Error::Conflict { id, children });
        }

        let deleted = self.store.delete_pool(id).await?;
        if deleted {
            self.locks.prune(&[id]);
            tracing::info!(pool_id = %id, "Deleted pool");
        }
        Ok(deleted)
    }

    /// Delete a pool and its whole subtree in one atomic store call
    ///
    /// `Ok(false)` if the pool does not exist.
    pub async fn delete_pool_cascade(&self, id: PoolId) -> Result<bool> {
        let _guard = self.locks.exclusive().await;

        let pools = self.store.list_pools().await?;
        if !pools.iter().any(|p| p.id == id) {
            return Ok(false);
        }

        let order = collect_subtree(&pools, id);
        let removed = self.store.delete_pools(&order).await?;
        self.locks.prune(&order);

        tracing::info!(pool_id = %id, removed, "Deleted pool subtree");
        Ok(true)
    }

    // ==================== Reads ====================

    /// Get a pool by ID
    pub async fn get_pool(&self, id: PoolId) -> Result<Option<Pool>> {
        self.store.get_pool(id).await
    }

    /// List all pools
    pub async fn list_pools(&self) -> Result<Vec<Pool>> {
        self.store.list_pools().await
    }

    /// The pool forest, or the tree under `root`
    pub async fn get_pool_hierarchy(&self, root: Option<PoolId>) -> Result<Vec<PoolWithStats>> {
        let pools = self.store.list_pools().await?;
        let forest = build_hierarchy(&pools, root)?;
        tracing::debug!(?root, nodes = node_count(&forest), "Built pool hierarchy");
        Ok(forest)
    }

    /// Utilization from direct children
    pub async fn calculate_pool_utilization(&self, id: PoolId) -> Result<PoolStats> {
        let pools = self.store.list_pools().await?;
        let pool = find(&pools, id)?;
        utilization::calculate_utilization(pool, siblings_of(&pools, Some(id)))
    }

    /// Utilization counted over leaf descendants
    pub async fn calculate_recursive_utilization(&self, id: PoolId) -> Result<PoolStats> {
        let pools = self.store.list_pools().await?;
        let pool = find(&pools, id)?;
        utilization::calculate_recursive_utilization(pool, &pools)
    }

    /// A page of `/new_prefix_len` blocks of the pool, classified against its
    /// direct children
    ///
    /// `limit` defaults to `default_block_limit` and is clamped to
    /// `1..=max_block_limit`.
    pub async fn list_blocks(
        &self,
        id: PoolId,
        new_prefix_len: u8,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<BlockListing> {
        let pools = self.store.list_pools().await?;
        let pool = find(&pools, id)?;
        let net = stored_prefix(pool)?;

        let limit = limit
            .unwrap_or(self.config.default_block_limit as u64)
            .clamp(1, self.config.max_block_limit.max(1) as u64);

        let window = window_of(&net, new_prefix_len, offset, limit)?;
        let children: Vec<Pool> = siblings_of(&pools, Some(id)).cloned().collect();
        let blocks = classify_blocks(&window.blocks, &children)?;

        Ok(BlockListing {
            pool_id: id,
            pool_cidr: pool.cidr.clone(),
            prefix_len: new_prefix_len,
            total_blocks: window.total_blocks,
            hosts_per_block: window.hosts_per_block,
            offset,
            limit,
            blocks,
        })
    }

    /// First `/prefix_len` block of the pool not touched by a direct child
    pub async fn find_free_block(&self, id: PoolId, prefix_len: u8) -> Result<Option<Ipv4Net>> {
        let pools = self.store.list_pools().await?;
        let pool = find(&pools, id)?;
        let net = stored_prefix(pool)?;
        let children: Vec<Pool> = siblings_of(&pools, Some(id)).cloned().collect();
        first_free_block(&net, prefix_len, &children)
    }
}

fn find(pools: &[Pool], id: PoolId) -> Result<&Pool> {
    pools.iter().find(|p| p.id == id).ok_or(Error::NotFound(id))
}

fn stored_prefix(pool: &Pool) -> Result<Ipv4Net> {
    parse_prefix(&pool.cidr).map_err(|_| {
        Error::Internal(format!(
            "stored pool {} has unparseable CIDR {}",
            pool.id, pool.cidr
        ))
    })
}

fn rejected(cidr: &Ipv4Net, err: Error) -> Error {
    tracing::warn!(cidr = %cidr, reason = %err, "Rejected pool");
    err
}
