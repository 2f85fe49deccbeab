//! In-memory pool store

use super::PoolStore;
use crate::models::{NewPool, Pool, PoolId, PoolPatch};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pool rows plus the ID sequence, shared by the in-memory and file backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PoolTable {
    /// Version for migration purposes
    pub version: u32,
    /// Next ID to hand out; IDs are never reused
    pub next_id: PoolId,
    pub pools: BTreeMap<PoolId, Pool>,
}

impl Default for PoolTable {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            next_id: 1,
            pools: BTreeMap::new(),
        }
    }
}

impl PoolTable {
    /// Current data format version
    pub const CURRENT_VERSION: u32 = 1;

    pub fn list(&self) -> Vec<Pool> {
        self.pools.values().cloned().collect()
    }

    pub fn insert(&mut self, input: NewPool) -> Pool {
        let id = self.next_id;
        self.next_id += 1;

        let now = Utc::now();
        let pool = Pool {
            id,
            name: input.name,
            description: input.description,
            cidr: input.cidr,
            parent_id: input.parent_id,
            account_id: input.account_id,
            pool_type: input.pool_type,
            status: input.status,
            created_at: now,
            updated_at: now,
        };
        self.pools.insert(id, pool.clone());
        pool
    }

    pub fn update(&mut self, id: PoolId, patch: &PoolPatch) -> Option<Pool> {
        let pool = self.pools.get_mut(&id)?;
        patch.apply(pool, Utc::now());
        Some(pool.clone())
    }

    pub fn delete_many(&mut self, ids: &[PoolId]) -> Result<usize> {
        if let Some(missing) = ids.iter().find(|id| !self.pools.contains_key(id)) {
            return Err(Error::NotFound(*missing));
        }
        Ok(ids
            .iter()
            .filter(|id| self.pools.remove(id).is_some())
            .count())
    }
}

/// Volatile pool store
#[derive(Debug, Default)]
pub struct InMemoryPoolStore {
    table: RwLock<PoolTable>,
}

impl InMemoryPoolStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored pools
    pub fn len(&self) -> usize {
        self.table.read().pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PoolStore for InMemoryPoolStore {
    async fn list_pools(&self) -> Result<Vec<Pool>> {
        Ok(self.table.read().list())
    }

    async fn get_pool(&self, id: PoolId) -> Result<Option<Pool>> {
        Ok(self.table.read().pools.get(&id).cloned())
    }

    async fn insert_pool(&self, input: NewPool) -> Result<Pool> {
        Ok(self.table.write().insert(input))
    }

    async fn update_pool(&self, id: PoolId, patch: &PoolPatch) -> Result<Option<Pool>> {
        Ok(self.table.write().update(id, patch))
    }

    async fn delete_pool(&self, id: PoolId) -> Result<bool> {
        Ok(self.table.write().pools.remove(&id).is_some())
    }

    async fn delete_pools(&self, ids: &[PoolId]) -> Result<usize> {
        self.table.write().delete_many(ids)
    }
}
