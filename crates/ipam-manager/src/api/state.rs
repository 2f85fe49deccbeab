//! Application state for the API
//!
//! Holds shared state across all API handlers.

use crate::service::PoolManager;
use crate::store::PoolStore;
use std::sync::Arc;

/// Application state shared across handlers
///
/// `PoolManager` does its own locking, so handlers share it directly.
pub struct AppState {
    /// Pool manager service
    pub manager: PoolManager,
}

impl AppState {
    /// Create new application state over an in-memory store
    pub fn new() -> Self {
        Self::with_manager(PoolManager::in_memory())
    }

    /// Create with custom manager
    pub fn with_manager(manager: PoolManager) -> Self {
        Self { manager }
    }

    /// Create over a given store with default configuration
    pub fn with_store(store: Arc<dyn PoolStore>) -> Self {
        Self::with_manager(PoolManager::new(store))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
