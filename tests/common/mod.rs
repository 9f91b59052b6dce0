//! Shared helpers for the HTTP integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use catalog_api::config::DatabaseConfig;
use catalog_api::database::DatabaseEngine;
use catalog_api::server::{router, AppState};
use catalog_api::storage::{MemoryStorage, Storage};
use catalog_api::Author;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Storage seeded with "Author 1" .. "Author {count}"
pub fn memory_storage(count: u64) -> MemoryStorage {
    MemoryStorage::new().with_authors(
        (1..=count)
            .map(|i| Author::new(i, format!("Author {i}")))
            .collect(),
    )
}

/// In-memory DuckDB with the schema and the same seed authors
pub async fn duckdb_storage(count: u64) -> DatabaseEngine {
    let engine = DatabaseEngine::open_with_schema(&DatabaseConfig::in_memory())
        .await
        .unwrap();
    for i in 1..=count {
        engine.insert_author(&format!("Author {i}")).await.unwrap();
    }
    engine
}

pub fn app(storage: impl Storage + 'static) -> Router {
    router(AppState::new(Arc::new(storage)), Duration::from_secs(5))
}

/// Send one request and decode the JSON body
pub async fn call(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    call(app, Method::GET, uri, "").await
}

pub async fn post(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    call(app, Method::POST, uri, body).await
}

/// Ids of the entities in a success envelope
pub fn ids(body: &Value) -> Vec<u64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_u64().unwrap())
        .collect()
}
