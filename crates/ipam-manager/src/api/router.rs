//! API router configuration
//!
//! Defines all API routes and middleware.

use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pools
        .route(
            "/api/v1/pools",
            get(handlers::list_pools).post(handlers::create_pool),
        )
        .route(
            "/api/v1/pools/:id",
            get(handlers::get_pool)
                .patch(handlers::update_pool)
                .delete(handlers::delete_pool),
        )
        .route("/api/v1/pools/:id/stats", get(handlers::get_pool_stats))
        .route("/api/v1/pools/:id/blocks", get(handlers::list_pool_blocks))
        .route("/api/v1/pools/:id/next-free", get(handlers::next_free_block))
        // Hierarchy
        .route("/api/v1/hierarchy", get(handlers::get_hierarchy))
        // Calculator
        .route("/api/v1/subnets/window", get(handlers::subnet_window))
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ApiServerConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("IPAM_API_HOST").unwrap_or(defaults.host),
            port: std::env::var("IPAM_API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(Arc::new(AppState::new()))
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_check() {
        let response = app()
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_pools_empty() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/pools")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_pool_not_found() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/pools/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_pool_not_found() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/v1/pools/42?cascade=true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hierarchy_empty() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/hierarchy")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_api_config_default() {
        let config = ApiServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }
}
