//! Data Transfer Objects for the REST API
//!
//! Request and response types for API endpoints.

use crate::models::{NewPool, PoolId, PoolStats, PoolStatus, PoolType};
use serde::{Deserialize, Serialize};

// ============================================================================
// Pool DTOs
// ============================================================================

/// Request to create a new pool (API)
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePoolDto {
    /// Human-readable name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// CIDR block, canonicalized on create
    pub cidr: String,
    /// Parent pool; omit for a top-level pool
    pub parent_id: Option<PoolId>,
    /// Owning cloud account
    pub account_id: Option<i64>,
    /// Pool type (defaults to `subnet`)
    #[serde(rename = "type")]
    pub pool_type: Option<PoolType>,
    /// Pool status (defaults to `active`)
    pub status: Option<PoolStatus>,
}

impl From<CreatePoolDto> for NewPool {
    fn from(dto: CreatePoolDto) -> Self {
        NewPool {
            name: dto.name,
            description: dto.description,
            cidr: dto.cidr,
            parent_id: dto.parent_id,
            account_id: dto.account_id,
            pool_type: dto.pool_type.unwrap_or_default(),
            status: dto.status.unwrap_or_default(),
        }
    }
}

/// List pools query parameters
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListPoolsQuery {
    /// Only children of this pool
    pub parent_id: Option<PoolId>,
    /// Only top-level pools
    pub top_level: Option<bool>,
    /// Pagination offset
    pub offset: Option<usize>,
    /// Pagination limit
    pub limit: Option<usize>,
}

/// Delete pool query parameters
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeletePoolQuery {
    /// Remove the whole subtree
    #[serde(default)]
    pub cascade: bool,
}

/// Pool stats query parameters
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatsQuery {
    /// Count leaf descendants instead of direct children
    #[serde(default)]
    pub recursive: bool,
}

/// Pool stats response
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatsResponse {
    pub pool_id: PoolId,
    pub cidr: String,
    pub recursive: bool,
    #[serde(flatten)]
    pub stats: PoolStats,
}

// ============================================================================
// Block DTOs
// ============================================================================

/// Block listing query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct BlocksQuery {
    pub prefix_len: u8,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// Next free block query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct NextFreeQuery {
    pub prefix_len: u8,
}

/// Next free block response; `cidr` is `None` when the pool is full
#[derive(Debug, Clone, Serialize)]
pub struct NextFreeResponse {
    pub pool_id: PoolId,
    pub prefix_len: u8,
    pub cidr: Option<String>,
}

/// Stateless subnet window query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct WindowQuery {
    pub cidr: String,
    pub prefix_len: u8,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// Stateless subnet window response
#[derive(Debug, Clone, Serialize)]
pub struct WindowResponse {
    pub cidr: String,
    pub prefix_len: u8,
    pub total_blocks: u64,
    pub hosts_per_block: u64,
    pub offset: u64,
    pub limit: u64,
    pub blocks: Vec<String>,
}

// ============================================================================
// Hierarchy DTOs
// ============================================================================

/// Hierarchy query parameters
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HierarchyQuery {
    /// Build only the tree under this pool
    pub root_id: Option<PoolId>,
}

// ============================================================================
// Common DTOs
// ============================================================================

/// Paginated list response
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

/// API error response
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        Self::new(
            "NOT_FOUND",
            format!("{} with id '{}' not found", resource, id),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

/// Empty success response
#[derive(Debug, Clone, Serialize)]
pub struct EmptyResponse {
    pub success: bool,
    pub message: String,
}

impl EmptyResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
