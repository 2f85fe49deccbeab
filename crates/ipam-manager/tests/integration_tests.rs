//! Integration tests for ipam-manager API
//!
//! Tests full API workflows including pool creation, validation failures,
//! block listing, hierarchy and deletion.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use ipam_manager::api::{create_router, AppState};
use ipam_manager::store::JsonFilePoolStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Helper to create a test app
fn create_test_app() -> axum::Router {
    let state = Arc::new(AppState::new());
    create_router(state)
}

/// Helper to make a JSON request
fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Helper to extract JSON from response
async fn response_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Create a pool and return its JSON
async fn create_pool(app: &axum::Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/v1/pools", Some(body)))
        .await
        .unwrap();
    let status = response.status();
    (status, response_json(response).await)
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request(Method::GET, uri, None))
        .await
        .unwrap();
    let status = response.status();
    (status, response_json(response).await)
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ready_endpoint() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(Method::GET, "/ready", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Pool CRUD Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_get_pool() {
    let app = create_test_app();

    let (status, pool) = create_pool(
        &app,
        json!({
            "name": "corp",
            "description": "Corporate supernet",
            "cidr": "10.0.0.7/8",
            "type": "supernet"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(pool["cidr"], "10.0.0.0/8");
    assert_eq!(pool["type"], "supernet");
    assert_eq!(pool["status"], "active");

    let id = pool["id"].as_i64().unwrap();
    let (status, fetched) = get(&app, &format!("/api/v1/pools/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "corp");
}

#[tokio::test]
async fn test_create_validation_statuses() {
    let app = create_test_app();

    let (_, root) = create_pool(&app, json!({ "name": "root", "cidr": "10.0.0.0/16" })).await;
    let root_id = root["id"].as_i64().unwrap();

    let (status, body) = create_pool(&app, json!({ "name": "bad", "cidr": "10.0.0.0/33" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _) = create_pool(
        &app,
        json!({ "name": "outside", "cidr": "10.1.0.0/24", "parent_id": root_id }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = create_pool(
        &app,
        json!({ "name": "missing", "cidr": "10.0.0.0/24", "parent_id": 999 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, first) = create_pool(
        &app,
        json!({ "name": "a", "cidr": "10.0.0.0/24", "parent_id": root_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = create_pool(
        &app,
        json!({ "name": "a-half", "cidr": "10.0.0.0/25", "parent_id": root_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["conflicting_id"], first["id"]);
    assert_eq!(body["details"]["conflicting_cidr"], "10.0.0.0/24");

    let (status, _) = create_pool(
        &app,
        json!({ "name": "a-again", "cidr": "10.0.0.0/24", "parent_id": root_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_pool() {
    let app = create_test_app();
    let (_, pool) = create_pool(&app, json!({ "name": "lab", "cidr": "192.168.0.0/16" })).await;
    let id = pool["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/v1/pools/{}", id),
            Some(json!({ "name": "lab-2", "status": "deprecated", "account_id": 12 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = response_json(response).await;
    assert_eq!(updated["name"], "lab-2");
    assert_eq!(updated["status"], "deprecated");
    assert_eq!(updated["account_id"], 12);
    assert_eq!(updated["cidr"], "192.168.0.0/16");

    let response = app
        .oneshot(json_request(
            Method::PATCH,
            "/api/v1/pools/999",
            Some(json!({ "name": "ghost" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_pools_filters() {
    let app = create_test_app();
    let (_, root) = create_pool(&app, json!({ "name": "root", "cidr": "10.0.0.0/16" })).await;
    let root_id = root["id"].as_i64().unwrap();
    create_pool(&app, json!({ "name": "other", "cidr": "172.16.0.0/12" })).await;
    for i in 0..3 {
        create_pool(
            &app,
            json!({ "name": format!("c{}", i), "cidr": format!("10.0.{}.0/24", i), "parent_id": root_id }),
        )
        .await;
    }

    let (_, all) = get(&app, "/api/v1/pools").await;
    assert_eq!(all["total"], 5);

    let (_, top) = get(&app, "/api/v1/pools?top_level=true").await;
    assert_eq!(top["total"], 2);

    let (_, children) = get(&app, &format!("/api/v1/pools?parent_id={}&limit=2", root_id)).await;
    assert_eq!(children["total"], 3);
    assert_eq!(children["items"].as_array().unwrap().len(), 2);
}

// ============================================================================
// Deletion Tests
// ============================================================================

#[tokio::test]
async fn test_delete_conflict_then_cascade() {
    let app = create_test_app();
    let (_, root) = create_pool(&app, json!({ "name": "root", "cidr": "10.0.0.0/16" })).await;
    let root_id = root["id"].as_i64().unwrap();
    let (_, child) = create_pool(
        &app,
        json!({ "name": "child", "cidr": "10.0.1.0/24", "parent_id": root_id }),
    )
    .await;
    let child_id = child["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(Method::DELETE, &format!("/api/v1/pools/{}", root_id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response_json(response).await;
    assert_eq!(body["details"]["children"], 1);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/v1/pools/{}?cascade=true", root_id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = get(&app, &format!("/api/v1/pools/{}", root_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&app, &format!("/api/v1/pools/{}", child_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Stats, Blocks and Hierarchy Tests
// ============================================================================

#[tokio::test]
async fn test_stats_direct_and_recursive() {
    let app = create_test_app();
    let (_, root) = create_pool(&app, json!({ "name": "root", "cidr": "10.0.0.0/16" })).await;
    let root_id = root["id"].as_i64().unwrap();
    let (_, mid) = create_pool(
        &app,
        json!({ "name": "mid", "cidr": "10.0.0.0/20", "parent_id": root_id }),
    )
    .await;
    create_pool(
        &app,
        json!({ "name": "leaf", "cidr": "10.0.0.0/24", "parent_id": mid["id"] }),
    )
    .await;

    let (status, direct) = get(&app, &format!("/api/v1/pools/{}/stats", root_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(direct["total"], 65534);
    assert_eq!(direct["allocated"], 4094);
    assert_eq!(direct["recursive"], false);

    let (_, recursive) = get(&app, &format!("/api/v1/pools/{}/stats?recursive=true", root_id)).await;
    assert_eq!(recursive["allocated"], 254);
    assert_eq!(recursive["recursive"], true);

    let (status, _) = get(&app, "/api/v1/pools/999/stats").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blocks_and_next_free() {
    let app = create_test_app();
    let (_, root) = create_pool(&app, json!({ "name": "root", "cidr": "10.0.0.0/24" })).await;
    let root_id = root["id"].as_i64().unwrap();
    let (_, used) = create_pool(
        &app,
        json!({ "name": "web", "cidr": "10.0.0.0/26", "parent_id": root_id, "account_id": 7 }),
    )
    .await;
    create_pool(
        &app,
        json!({ "name": "db", "cidr": "10.0.0.128/27", "parent_id": root_id }),
    )
    .await;

    let (status, listing) = get(&app, &format!("/api/v1/pools/{}/blocks?prefix_len=26", root_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total_blocks"], 4);
    let blocks = listing["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[0]["status"], "used");
    assert_eq!(blocks[0]["pool_id"], used["id"]);
    assert_eq!(blocks[0]["account_id"], 7);
    assert_eq!(blocks[1]["status"], "free");
    assert_eq!(blocks[2]["status"], "exists_elsewhere");
    assert_eq!(blocks[3]["status"], "free");

    let (status, _) = get(&app, &format!("/api/v1/pools/{}/blocks?prefix_len=20", root_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, next) = get(&app, &format!("/api/v1/pools/{}/next-free?prefix_len=26", root_id)).await;
    assert_eq!(next["cidr"], "10.0.0.64/26");
}

#[tokio::test]
async fn test_hierarchy_endpoint() {
    let app = create_test_app();
    let (_, root) = create_pool(&app, json!({ "name": "root", "cidr": "10.0.0.0/16" })).await;
    let root_id = root["id"].as_i64().unwrap();
    create_pool(
        &app,
        json!({ "name": "child", "cidr": "10.0.8.0/21", "parent_id": root_id }),
    )
    .await;
    create_pool(&app, json!({ "name": "solo", "cidr": "192.168.0.0/24" })).await;

    let (status, forest) = get(&app, "/api/v1/hierarchy").await;
    assert_eq!(status, StatusCode::OK);
    let forest = forest.as_array().unwrap();
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[0]["name"], "root");
    assert_eq!(forest[0]["stats"]["child_count"], 1);
    assert_eq!(forest[0]["children"][0]["name"], "child");

    let (status, tree) = get(&app, &format!("/api/v1/hierarchy?root_id={}", root_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tree.as_array().unwrap().len(), 1);

    let (status, _) = get(&app, "/api/v1/hierarchy?root_id=999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_point_to_point_split_stats_and_hierarchy() {
    let app = create_test_app();
    let (_, link) = create_pool(&app, json!({ "name": "link", "cidr": "10.0.0.0/30" })).await;
    let link_id = link["id"].as_i64().unwrap();
    for cidr in ["10.0.0.0/31", "10.0.0.2/31"] {
        let (status, _) = create_pool(
            &app,
            json!({ "name": cidr, "cidr": cidr, "parent_id": link_id }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    create_pool(&app, json!({ "name": "other", "cidr": "192.168.0.0/16" })).await;

    let (status, stats) = get(&app, &format!("/api/v1/pools/{}/stats", link_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["allocated"], 4);
    assert_eq!(stats["free"], 0);
    assert_eq!(stats["utilization_percent"], 100.0);

    let (status, forest) = get(&app, "/api/v1/hierarchy").await;
    assert_eq!(status, StatusCode::OK);
    let forest = forest.as_array().unwrap();
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[0]["stats"]["free"], 0);
    assert_eq!(forest[0]["children"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_subnet_window_endpoint() {
    let app = create_test_app();

    let (status, window) = get(&app, "/api/v1/subnets/window?cidr=10.0.0.0/8&prefix_len=32&limit=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(window["total_blocks"], 16_777_216u64);
    assert_eq!(window["blocks"].as_array().unwrap().len(), 5);
    assert_eq!(window["blocks"][4], "10.0.0.4/32");

    let (status, window) =
        get(&app, "/api/v1/subnets/window?cidr=10.0.0.0/24&prefix_len=26&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(window["blocks"].as_array().unwrap().len(), 4);

    let (status, _) = get(&app, "/api/v1/subnets/window?cidr=10.0.0.0/24&prefix_len=16").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// File Store Tests
// ============================================================================

#[tokio::test]
async fn test_file_backed_state_persists() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("pools.json");

    {
        let store = Arc::new(JsonFilePoolStore::open(&path).unwrap());
        let app = create_router(Arc::new(AppState::with_store(store)));
        let (status, _) = create_pool(&app, json!({ "name": "root", "cidr": "10.0.0.0/8" })).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let store = Arc::new(JsonFilePoolStore::open(&path).unwrap());
    let app = create_router(Arc::new(AppState::with_store(store)));
    let (_, list) = get(&app, "/api/v1/pools").await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["items"][0]["cidr"], "10.0.0.0/8");
}
