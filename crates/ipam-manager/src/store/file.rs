//! Pool store persisted to a JSON file

use super::memory::PoolTable;
use super::PoolStore;
use crate::models::{NewPool, Pool, PoolId, PoolPatch};
use crate::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// JSON-file pool store
///
/// Every write builds the next table, persists it, and only then replaces
/// the in-memory copy. A failed write leaves both the file and memory
/// untouched.
#[derive(Debug)]
pub struct JsonFilePoolStore {
    path: PathBuf,
    table: Mutex<PoolTable>,
}

impl JsonFilePoolStore {
    /// Open a store at `path`, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let table = Self::load(&path)?;
        tracing::info!(path = %path.display(), pools = table.pools.len(), "Opened pool store");
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<PoolTable> {
        if !path.exists() {
            return Ok(PoolTable::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Storage(format!("Failed to read pool file {}: {}", path.display(), e))
        })?;
        let table: PoolTable = serde_json::from_str(&content).map_err(|e| {
            Error::Storage(format!("Failed to parse pool file {}: {}", path.display(), e))
        })?;
        if table.version != PoolTable::CURRENT_VERSION {
            return Err(Error::Storage(format!(
                "Unsupported pool file version {} (expected {})",
                table.version,
                PoolTable::CURRENT_VERSION
            )));
        }
        Ok(table)
    }

    fn save(&self, table: &PoolTable) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(table)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| {
            Error::Storage(format!("Failed to write pool file {}: {}", tmp.display(), e))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            Error::Storage(format!(
                "Failed to replace pool file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }

    /// Run `op` on a copy of the table and commit it if persisting succeeds
    fn commit<T>(&self, op: impl FnOnce(&mut PoolTable) -> Result<T>) -> Result<T> {
        let mut table = self.table.lock();
        let mut next = table.clone();
        let out = op(&mut next)?;
        self.save(&next)?;
        *table = next;
        Ok(out)
    }
}

#[async_trait]
impl PoolStore for JsonFilePoolStore {
    async fn list_pools(&self) -> Result<Vec<Pool>> {
        Ok(self.table.lock().list())
    }

    async fn get_pool(&self, id: PoolId) -> Result<Option<Pool>> {
        Ok(self.table.lock().pools.get(&id).cloned())
    }

    async fn insert_pool(&self, input: NewPool) -> Result<Pool> {
        self.commit(|t| Ok(t.insert(input)))
    }

    async fn update_pool(&self, id: PoolId, patch: &PoolPatch) -> Result<Option<Pool>> {
        if !self.table.lock().pools.contains_key(&id) {
            return Ok(None);
        }
        self.commit(|t| Ok(t.update(id, patch)))
    }

    async fn delete_pool(&self, id: PoolId) -> Result<bool> {
        if !self.table.lock().pools.contains_key(&id) {
            return Ok(false);
        }
        self.commit(|t| Ok(t.pools.remove(&id).is_some()))
    }

    async fn delete_pools(&self, ids: &[PoolId]) -> Result<usize> {
        self.commit(|t| t.delete_many(ids))
    }
}
