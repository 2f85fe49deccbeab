//! Pool and related models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage-assigned pool identifier
pub type PoolId = i64;

/// Classification of a pool within the address plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    /// Top-level aggregate block
    Supernet,
    /// Regional carve-out
    Region,
    /// Environment (prod, staging, ...)
    Environment,
    /// Cloud VPC / VNet range
    Vpc,
    /// Leaf subnet
    #[default]
    Subnet,
}

/// Lifecycle status of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    /// Reserved in the plan, not yet in use
    Planned,
    /// In use
    #[default]
    Active,
    /// Being retired
    Deprecated,
}

/// An IPv4 address pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Identifier assigned by storage
    pub id: PoolId,
    /// Human-readable name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Canonical CIDR block (e.g., "10.0.0.0/24"), immutable after creation
    pub cidr: String,
    /// Parent pool, `None` for top-level pools
    #[serde(default)]
    pub parent_id: Option<PoolId>,
    /// Owning cloud account
    #[serde(default)]
    pub account_id: Option<i64>,
    /// Pool type tag
    #[serde(rename = "type")]
    pub pool_type: PoolType,
    /// Pool status tag
    pub status: PoolStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Pool {
    /// Whether this pool has no parent
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Ordering key for deterministic sibling ordering
    pub fn order_key(&self) -> (DateTime<Utc>, PoolId) {
        (self.created_at, self.id)
    }
}

/// Input for creating a pool
///
/// The manager validates and canonicalizes this before it reaches storage;
/// `PoolStore::insert_pool` stores it as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cidr: String,
    #[serde(default)]
    pub parent_id: Option<PoolId>,
    #[serde(default)]
    pub account_id: Option<i64>,
    #[serde(rename = "type", default)]
    pub pool_type: PoolType,
    #[serde(default)]
    pub status: PoolStatus,
}

impl NewPool {
    /// Create a new pool input with default type and status
    pub fn new(name: impl Into<String>, cidr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            cidr: cidr.into(),
            parent_id: None,
            account_id: None,
            pool_type: PoolType::default(),
            status: PoolStatus::default(),
        }
    }

    /// Place the pool under a parent
    pub fn with_parent(mut self, parent_id: PoolId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Assign an owning account
    pub fn with_account(mut self, account_id: i64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Set the pool type
    pub fn with_type(mut self, pool_type: PoolType) -> Self {
        self.pool_type = pool_type;
        self
    }
}

/// Partial update for a pool
///
/// Only non-CIDR, non-parent fields can change. For the optional fields the
/// outer `Option` means "leave as is" and the inner one clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Option<i64>>,
    #[serde(rename = "type", default)]
    pub pool_type: Option<PoolType>,
    #[serde(default)]
    pub status: Option<PoolStatus>,
}

impl PoolPatch {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.account_id.is_none()
            && self.pool_type.is_none()
            && self.status.is_none()
    }

    /// Apply the patch to a pool in place
    pub fn apply(&self, pool: &mut Pool, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            pool.name = name.clone();
        }
        if let Some(description) = &self.description {
            pool.description = description.clone();
        }
        if let Some(account_id) = self.account_id {
            pool.account_id = account_id;
        }
        if let Some(pool_type) = self.pool_type {
            pool.pool_type = pool_type;
        }
        if let Some(status) = self.status {
            pool.status = status;
        }
        pool.updated_at = now;
    }
}

/// Distinguishes an absent field from an explicit `null` in JSON patches.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
