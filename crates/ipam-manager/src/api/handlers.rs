//! REST API handlers
//!
//! Implements handlers for pool, block, hierarchy and window endpoints.

use super::dto::*;
use super::state::AppState;
use crate::blocks::compute_subnets_window;
use crate::models::{Pool, PoolId, PoolPatch, PoolWithStats};
use crate::service::BlockListing;
use crate::Error;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

type ApiFailure = (StatusCode, Json<ApiError>);

/// Convert internal error to API response
pub(crate) fn error_response(err: Error) -> ApiFailure {
    let (status, error) = match &err {
        Error::NotFound(id) => (
            StatusCode::NOT_FOUND,
            ApiError::not_found("Pool", &id.to_string()),
        ),
        Error::ParentNotFound(id) => (
            StatusCode::NOT_FOUND,
            ApiError::not_found("Parent pool", &id.to_string()),
        ),
        Error::InvalidCidr(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg.clone())),
        Error::InvalidArgument(msg) => {
            (StatusCode::BAD_REQUEST, ApiError::bad_request(msg.clone()))
        }
        Error::Containment { child, parent } => (
            StatusCode::BAD_REQUEST,
            ApiError::bad_request(err.to_string())
                .with_details(json!({ "cidr": child, "parent_cidr": parent })),
        ),
        Error::Overlap {
            conflicting_id,
            conflicting_cidr,
            ..
        } => (
            StatusCode::CONFLICT,
            ApiError::conflict(err.to_string()).with_details(json!({
                "conflicting_id": conflicting_id,
                "conflicting_cidr": conflicting_cidr,
            })),
        ),
        Error::DuplicateCidr { conflicting_id, .. } => (
            StatusCode::CONFLICT,
            ApiError::conflict(err.to_string())
                .with_details(json!({ "conflicting_id": conflicting_id })),
        ),
        Error::Conflict { children, .. } => (
            StatusCode::CONFLICT,
            ApiError::conflict(err.to_string()).with_details(json!({ "children": children })),
        ),
        Error::Storage(_) | Error::Internal(_) => {
            tracing::error!(error = %err, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal("internal server error"),
            )
        }
    };

    (status, Json(error))
}

// ============================================================================
// Pool Handlers
// ============================================================================

/// List pools
pub async fn list_pools(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPoolsQuery>,
) -> Result<Json<PaginatedResponse<Pool>>, ApiFailure> {
    let pools: Vec<Pool> = state
        .manager
        .list_pools()
        .await
        .map_err(error_response)?
        .into_iter()
        .filter(|p| {
            query.parent_id.map_or(true, |id| p.parent_id == Some(id))
                && query.top_level.map_or(true, |top| p.is_top_level() == top)
        })
        .collect();

    let total = pools.len();
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(100).min(1000);

    Ok(Json(PaginatedResponse {
        items: pools.into_iter().skip(offset).take(limit).collect(),
        total,
        offset,
        limit,
    }))
}

/// Get a single pool
pub async fn get_pool(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PoolId>,
) -> Result<Json<Pool>, ApiFailure> {
    let pool = state
        .manager
        .get_pool(id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| error_response(Error::NotFound(id)))?;
    Ok(Json(pool))
}

/// Create a new pool
pub async fn create_pool(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePoolDto>,
) -> Result<(StatusCode, Json<Pool>), ApiFailure> {
    let pool = state
        .manager
        .create_pool(req.into())
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(pool)))
}

/// Update a pool's descriptive fields
pub async fn update_pool(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PoolId>,
    Json(patch): Json<PoolPatch>,
) -> Result<Json<Pool>, ApiFailure> {
    let pool = state
        .manager
        .update_pool(id, patch)
        .await
        .map_err(error_response)?
        .ok_or_else(|| error_response(Error::NotFound(id)))?;
    Ok(Json(pool))
}

/// Delete a pool, optionally with its subtree
pub async fn delete_pool(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PoolId>,
    Query(query): Query<DeletePoolQuery>,
) -> Result<Json<EmptyResponse>, ApiFailure> {
    let deleted = if query.cascade {
        state.manager.delete_pool_cascade(id).await
    } else {
        state.manager.delete_pool(id).await
    }
    .map_err(error_response)?;

    if !deleted {
        return Err(error_response(Error::NotFound(id)));
    }
    Ok(Json(EmptyResponse::ok("Pool deleted")))
}

/// Get pool utilization
pub async fn get_pool_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PoolId>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<PoolStatsResponse>, ApiFailure> {
    let pool = state
        .manager
        .get_pool(id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| error_response(Error::NotFound(id)))?;

    let stats = if query.recursive {
        state.manager.calculate_recursive_utilization(id).await
    } else {
        state.manager.calculate_pool_utilization(id).await
    }
    .map_err(error_response)?;

    Ok(Json(PoolStatsResponse {
        pool_id: id,
        cidr: pool.cidr,
        recursive: query.recursive,
        stats,
    }))
}

// ============================================================================
// Block Handlers
// ============================================================================

/// List candidate sub-blocks of a pool
pub async fn list_pool_blocks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PoolId>,
    Query(query): Query<BlocksQuery>,
) -> Result<Json<BlockListing>, ApiFailure> {
    let listing = state
        .manager
        .list_blocks(id, query.prefix_len, query.offset.unwrap_or(0), query.limit)
        .await
        .map_err(error_response)?;
    Ok(Json(listing))
}

/// First free block of a given size in a pool
pub async fn next_free_block(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PoolId>,
    Query(query): Query<NextFreeQuery>,
) -> Result<Json<NextFreeResponse>, ApiFailure> {
    let block = state
        .manager
        .find_free_block(id, query.prefix_len)
        .await
        .map_err(error_response)?;
    Ok(Json(NextFreeResponse {
        pool_id: id,
        prefix_len: query.prefix_len,
        cidr: block.map(|b| b.to_string()),
    }))
}

/// Enumerate sub-blocks of an arbitrary CIDR, with no pool involved
pub async fn subnet_window(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<WindowResponse>, ApiFailure> {
    let config = state.manager.config();
    let offset = query.offset.unwrap_or(0);
    let limit = query
        .limit
        .unwrap_or(config.default_block_limit as u64)
        .clamp(1, config.max_block_limit.max(1) as u64);

    let window = compute_subnets_window(&query.cidr, query.prefix_len, offset, limit)
        .map_err(error_response)?;

    Ok(Json(WindowResponse {
        cidr: query.cidr.trim().to_string(),
        prefix_len: query.prefix_len,
        total_blocks: window.total_blocks,
        hosts_per_block: window.hosts_per_block,
        offset,
        limit,
        blocks: window.blocks.iter().map(|b| b.to_string()).collect(),
    }))
}

// ============================================================================
// Hierarchy Handlers
// ============================================================================

/// Pool forest, or the tree under `root_id`
pub async fn get_hierarchy(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HierarchyQuery>,
) -> Result<Json<Vec<PoolWithStats>>, ApiFailure> {
    let forest = state
        .manager
        .get_pool_hierarchy(query.root_id)
        .await
        .map_err(error_response)?;
    Ok(Json(forest))
}

// ============================================================================
// Health Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint; fails when the store cannot be read
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.manager.list_pools().await {
        Ok(_) => (StatusCode::OK, "READY"),
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }
}
