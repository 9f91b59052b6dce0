//! HTTP integration tests
//!
//! Every scenario runs against both the in-memory storage and an
//! in-memory DuckDB database; the responses must be identical.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{app, duckdb_storage, get, ids, memory_storage, post};
use pretty_assertions::assert_eq;
use serde_json::json;

async fn backends(authors: u64) -> Vec<(&'static str, Router)> {
    vec![
        ("memory", app(memory_storage(authors))),
        ("duckdb", app(duckdb_storage(authors).await)),
    ]
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_authors_default_page() {
    for (backend, app) in backends(10).await {
        let (status, body) = get(&app, "/authors").await;
        assert_eq!(status, StatusCode::OK, "{backend}");
        assert_eq!(
            body,
            json!({
                "status_code": 200,
                "data": [
                    {"id": 1, "name": "Author 1"},
                    {"id": 2, "name": "Author 2"}
                ],
                "next_page_id": 2
            }),
            "{backend}"
        );
    }
}

#[tokio::test]
async fn test_walk_pages() {
    for (backend, app) in backends(10).await {
        let (_, first) = get(&app, "/authors?limit=5").await;
        assert_eq!(ids(&first), vec![1, 2, 3, 4, 5], "{backend}");
        assert_eq!(first["next_page_id"], 5, "{backend}");

        let (_, second) = get(&app, "/authors?limit=5&page_id=5").await;
        assert_eq!(ids(&second), vec![6, 7, 8, 9, 10], "{backend}");
        assert_eq!(second["next_page_id"], 10, "{backend}");

        let (status, last) = get(&app, "/authors?limit=5&page_id=10").await;
        assert_eq!(status, StatusCode::OK, "{backend}");
        assert_eq!(last, json!({"status_code": 200, "data": []}), "{backend}");
    }
}

#[tokio::test]
async fn test_filter_authors_by_name() {
    for (backend, app) in backends(10).await {
        let (_, body) = get(&app, "/authors?limit=3&name=7").await;
        assert_eq!(ids(&body), vec![7], "{backend}");

        let (_, body) = get(&app, "/authors?limit=3&name=author").await;
        assert_eq!(ids(&body), Vec::<u64>::new(), "{backend}");
    }
}

#[tokio::test]
async fn test_unknown_params_are_ignored() {
    for (backend, app) in backends(10).await {
        let (_, plain) = get(&app, "/authors?limit=3").await;
        let (_, noisy) = get(&app, "/authors?limit=3&sort=desc&publication_year=1").await;
        assert_eq!(plain, noisy, "{backend}");
    }
}

#[tokio::test]
async fn test_bad_cursor_values() {
    for (backend, app) in backends(10).await {
        for uri in [
            "/authors?limit=text",
            "/authors?limit=0",
            "/books?page_id=text",
            "/books?page_id=-1",
        ] {
            let (status, body) = get(&app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{backend} {uri}");
            assert_eq!(body["status_code"], 400, "{backend} {uri}");
            assert!(body["message"].as_str().unwrap().starts_with("bad "), "{backend} {uri}");
            assert!(body.get("data").is_none(), "{backend} {uri}");
        }
    }
}

// ============================================================================
// Books
// ============================================================================

#[tokio::test]
async fn test_create_and_list_book() {
    for (backend, app) in backends(3).await {
        let (status, created) = post(
            &app,
            "/books",
            r#"{"name":"Testing book","edition":3,"publication_year":2002,"authors":[1,2]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{backend}");
        assert_eq!(
            created,
            json!({
                "status_code": 201,
                "data": {
                    "id": 1,
                    "name": "Testing book",
                    "edition": 3,
                    "publication_year": 2002,
                    "authors": [1, 2]
                }
            }),
            "{backend}"
        );

        let (_, listed) = get(&app, "/books").await;
        assert_eq!(listed["data"], json!([created["data"].clone()]), "{backend}");
        assert_eq!(listed["next_page_id"], 2, "{backend}");
    }
}

#[tokio::test]
async fn test_filter_books() {
    for (backend, app) in backends(2).await {
        for body in [
            r#"{"name":"Rust in Action","edition":1,"publication_year":2021,"authors":[1]}"#,
            r#"{"name":"Dune","edition":1,"publication_year":1965,"authors":[2]}"#,
            r#"{"name":"Programming Rust","edition":2,"publication_year":2021,"authors":[1,2]}"#,
        ] {
            let (status, _) = post(&app, "/books", body).await;
            assert_eq!(status, StatusCode::CREATED, "{backend}");
        }

        let (_, body) = get(&app, "/books?limit=10&publication_year=2021").await;
        assert_eq!(ids(&body), vec![1, 3], "{backend}");

        let (_, body) = get(&app, "/books?limit=10&name=Rust&publication_year=2021").await;
        assert_eq!(ids(&body), vec![1, 3], "{backend}");

        let (_, body) = get(&app, "/books?limit=10&name=Dune&publication_year=2021").await;
        assert_eq!(ids(&body), Vec::<u64>::new(), "{backend}");

        let (status, body) = get(&app, "/books?publication_year=soon").await;
        assert_eq!(status, StatusCode::OK, "{backend}");
        assert_eq!(ids(&body), Vec::<u64>::new(), "{backend}");
    }
}

#[tokio::test]
async fn test_create_book_validation() {
    for (backend, app) in backends(2).await {
        let cases = [
            (r#"{"edition":1,"publication_year":2000,"authors":[1]}"#, "Missing name value"),
            (r#"{"name":"x","publication_year":2000,"authors":[1]}"#, "Missing edition value"),
            (r#"{"name":"x","edition":1,"authors":[1]}"#, "Missing publication_year value"),
            (r#"{"name":"x","edition":1,"publication_year":2000}"#, "Missing authors value"),
            (r#"{"name":"x","edition":1,"publication_year":2000,"authors":[]}"#, "Missing authors value"),
            ("not json", "Invalid request body"),
        ];
        for (body, message) in cases {
            let (status, response) = post(&app, "/books", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{backend} {body}");
            assert_eq!(
                response,
                json!({"status_code": 400, "message": message}),
                "{backend} {body}"
            );
        }

        let (_, listed) = get(&app, "/books").await;
        assert_eq!(ids(&listed), Vec::<u64>::new(), "{backend}");
    }
}

#[tokio::test]
async fn test_unknown_author_is_internal_error() {
    for (backend, app) in backends(2).await {
        let (status, body) = post(
            &app,
            "/books",
            r#"{"name":"Orphan","edition":1,"publication_year":2000,"authors":[1,99]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{backend}");
        assert_eq!(
            body,
            json!({"status_code": 500, "message": "Internal Error"}),
            "{backend}"
        );

        // Nothing from the failed insert is visible.
        let (_, listed) = get(&app, "/books").await;
        assert_eq!(ids(&listed), Vec::<u64>::new(), "{backend}");
    }
}

// ============================================================================
// Service
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = app(memory_storage(0));
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = app(memory_storage(1));
    let request = Request::builder()
        .uri("/authors")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");

    let app = common::app(memory_storage(1));
    let request = Request::builder().uri("/authors").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_unknown_route() {
    let app = app(memory_storage(0));
    let request = axum::http::Request::builder()
        .uri("/publishers")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
