//! Per-scope mutation locks
//!
//! Creates take the structural lock shared plus the mutex of their parent
//! scope, so creates under one parent run one at a time while other scopes
//! proceed. Deletes take the structural lock exclusively, which keeps a
//! parent from disappearing between a create's checks and its insert.

use crate::models::PoolId;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub(crate) struct ScopeLocks {
    structure: RwLock<()>,
    scopes: DashMap<Option<PoolId>, Arc<Mutex<()>>>,
}

/// Held by a create for its whole check-then-insert sequence
pub(crate) struct CreateGuard<'a> {
    _scope: OwnedMutexGuard<()>,
    _structure: RwLockReadGuard<'a, ()>,
}

impl ScopeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock_scope(&self, parent_id: Option<PoolId>) -> CreateGuard<'_> {
        let structure = self.structure.read().await;
        let scope = self.scopes.entry(parent_id).or_default().clone();
        CreateGuard {
            _scope: scope.lock_owned().await,
            _structure: structure,
        }
    }

    pub async fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.structure.read().await
    }

    pub async fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.structure.write().await
    }

    /// Drop the scope mutexes of removed pools
    ///
    /// Only call while holding [`ScopeLocks::exclusive`], so no create can be
    /// waiting on one of them.
    pub fn prune(&self, removed: &[PoolId]) {
        for id in removed {
            self.scopes.remove(&Some(*id));
        }
    }

    #[cfg(test)]
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}
