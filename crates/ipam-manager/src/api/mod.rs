//! REST API for pool management
//!
//! Provides HTTP endpoints over [`PoolManager`](crate::service::PoolManager).
//!
//! # Endpoints
//!
//! ## Pools
//! - `GET /api/v1/pools` - List pools (`parent_id`, `top_level`, `offset`, `limit`)
//! - `POST /api/v1/pools` - Create a pool
//! - `GET /api/v1/pools/:id` - Get pool details
//! - `PATCH /api/v1/pools/:id` - Update name, description, account, type or status
//! - `DELETE /api/v1/pools/:id` - Delete a pool (`?cascade=true` removes the subtree)
//! - `GET /api/v1/pools/:id/stats` - Utilization (`?recursive=true` counts leaves)
//! - `GET /api/v1/pools/:id/blocks` - Candidate sub-blocks (`prefix_len`, `offset`, `limit`)
//! - `GET /api/v1/pools/:id/next-free` - First free block (`prefix_len`)
//!
//! Overlap is checked among pools of the same parent only. Two pools under
//! different parents may hold the same CIDR.
//!
//! ## Hierarchy
//! - `GET /api/v1/hierarchy` - Pool forest with stats (`?root_id=` for one tree)
//!
//! ## Calculator
//! - `GET /api/v1/subnets/window` - Sub-blocks of any CIDR (`cidr`, `prefix_len`, `offset`, `limit`)
//!
//! ## Health
//! - `GET /health` - Health check
//! - `GET /ready` - Readiness check

pub mod dto;
pub mod handlers;
pub mod router;
pub mod state;

pub use dto::*;
pub use router::{create_router, ApiServerConfig};
pub use state::AppState;

use std::sync::Arc;

/// Start the API server
///
/// # Example
///
/// ```ignore
/// use ipam_manager::api::{start_server, AppState, ApiServerConfig};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let state = Arc::new(AppState::new());
///     let config = ApiServerConfig::default();
///     start_server(state, config).await.unwrap();
/// }
/// ```
pub async fn start_server(
    state: Arc<AppState>,
    config: ApiServerConfig,
) -> Result<(), std::io::Error> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr()).await?;

    tracing::info!("Starting API server on {}", config.bind_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
