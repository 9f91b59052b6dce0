//! Tests for request orchestration

use super::*;
use crate::error::Result;
use crate::filter::FilterSet;
use crate::pagination::Cursor;
use crate::storage::MemoryStorage;
use crate::types::{Author, Book, NewBook, QueryParams};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};

fn params(pairs: &[(&str, &str)]) -> QueryParams {
    pairs.iter().copied().collect()
}

fn memory_state(authors: u64) -> AppState {
    let storage = MemoryStorage::new().with_authors(
        (1..=authors)
            .map(|i| Author::new(i, format!("Author {i}")))
            .collect(),
    );
    AppState::new(Arc::new(storage))
}

/// Storage whose every call fails, counting how often it was reached
#[derive(Default)]
struct BrokenStorage {
    calls: AtomicUsize,
}

impl BrokenStorage {
    fn fail<T>(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::storage("connection refused"))
    }
}

#[async_trait]
impl Storage for BrokenStorage {
    async fn fetch_authors(&self, _: Cursor, _: &FilterSet<Author>) -> Result<Vec<Author>> {
        self.fail()
    }

    async fn fetch_books(&self, _: Cursor, _: &FilterSet<Book>) -> Result<Vec<Book>> {
        self.fail()
    }

    async fn insert_author(&self, _: &str) -> Result<Author> {
        self.fail()
    }

    async fn insert_book(&self, _: &NewBook) -> Result<Book> {
        self.fail()
    }
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_default_page() {
    let state = memory_state(10);
    let envelope = list::<Author>(&state, &QueryParams::new()).await;

    assert_eq!(envelope.status_code(), 200);
    assert_eq!(envelope.data().unwrap().len(), 2);
    assert_eq!(envelope.next_page_id(), Some(2));
}

#[tokio::test]
async fn test_list_follows_next_page() {
    let state = memory_state(10);
    let first = list::<Author>(&state, &params(&[("limit", "5")])).await;
    assert_eq!(first.next_page_id(), Some(5));

    let next = first.next_page_id().unwrap().to_string();
    let second = list::<Author>(&state, &params(&[("limit", "5"), ("page_id", next.as_str())])).await;
    let ids: Vec<u64> = second.data().unwrap().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![6, 7, 8, 9, 10]);
    assert_eq!(second.next_page_id(), Some(10));

    let third = list::<Author>(&state, &params(&[("limit", "5"), ("page_id", "10")])).await;
    assert!(third.data().unwrap().is_empty());
    assert_eq!(third.next_page_id(), None);
}

#[tokio::test]
async fn test_short_page_still_advertises_next() {
    let state = memory_state(3);
    let envelope = list::<Author>(&state, &params(&[("limit", "5")])).await;
    assert_eq!(envelope.data().unwrap().len(), 3);
    assert_eq!(envelope.next_page_id(), Some(5));
}

#[tokio::test]
async fn test_full_page_only_policy() {
    let state = memory_state(3).with_next_page_policy(NextPagePolicy::FullPageOnly);
    let envelope = list::<Author>(&state, &params(&[("limit", "5")])).await;
    assert_eq!(envelope.data().unwrap().len(), 3);
    assert_eq!(envelope.next_page_id(), None);
}

#[tokio::test]
async fn test_configured_default_limit() {
    let state = memory_state(10).with_decoder(CursorDecoder::new(4).unwrap());
    let envelope = list::<Author>(&state, &QueryParams::new()).await;
    assert_eq!(envelope.data().unwrap().len(), 4);
    assert_eq!(envelope.next_page_id(), Some(4));
}

#[tokio::test]
async fn test_unknown_params_do_not_change_result() {
    let state = memory_state(10);
    let plain = list::<Author>(&state, &params(&[("limit", "3")])).await;
    let noisy = list::<Author>(
        &state,
        &params(&[("limit", "3"), ("order", "desc"), ("publication_year", "x")]),
    )
    .await;
    assert_eq!(plain, noisy);
}

#[tokio::test]
async fn test_bad_cursor_never_reaches_storage() {
    let storage = Arc::new(BrokenStorage::default());
    let state = AppState::new(storage.clone());

    let envelope = list::<Author>(&state, &params(&[("limit", "text")])).await;
    assert_eq!(envelope.status_code(), 400);
    let envelope = list::<Book>(&state, &params(&[("page_id", "text")])).await;
    assert_eq!(envelope.status_code(), 400);

    assert_eq!(storage.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let storage = Arc::new(BrokenStorage::default());
    let state = AppState::new(storage.clone());

    let envelope = list::<Author>(&state, &QueryParams::new()).await;
    assert_eq!(
        envelope,
        Envelope::Error {
            status_code: 500,
            message: "Internal Error".to_string()
        }
    );
    assert_eq!(storage.calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Creating
// ============================================================================

#[tokio::test]
async fn test_create_book() {
    let state = memory_state(2);
    let body = br#"{"name":"Testing book","edition":3,"publication_year":2002,"authors":[1,2]}"#;
    let envelope = create(&state, body).await;

    assert_eq!(envelope.status_code(), 201);
    let book = envelope.data().unwrap();
    assert_eq!(book.author_ids, vec![1, 2]);

    let listed = list::<Book>(&state, &QueryParams::new()).await;
    assert_eq!(listed.data().unwrap(), &vec![book.clone()]);
}

#[tokio::test]
async fn test_create_book_missing_edition() {
    let state = memory_state(2);
    let body = br#"{"name":"Testing book","publication_year":2002,"authors":[1]}"#;
    let envelope = create(&state, body).await;
    assert_eq!(
        envelope,
        Envelope::Error {
            status_code: 400,
            message: "Missing edition value".to_string()
        }
    );
}

#[tokio::test]
async fn test_create_book_malformed_body() {
    let state = memory_state(2);
    let envelope = create(&state, b"{not json").await;
    assert_eq!(envelope.status_code(), 400);

    let envelope = create(&state, br#"{"name":"x","edition":"three"}"#).await;
    assert_eq!(
        envelope,
        Envelope::Error {
            status_code: 400,
            message: "Invalid request body".to_string()
        }
    );
}

#[tokio::test]
async fn test_create_book_validation_skips_storage() {
    let storage = Arc::new(BrokenStorage::default());
    let state = AppState::new(storage.clone());
    let envelope = create(&state, br#"{"name":"x","edition":1,"publication_year":1}"#).await;
    assert_eq!(envelope.status_code(), 400);
    assert_eq!(storage.calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Router
// ============================================================================

/// Storage that takes longer than any request deadline used below
struct SlowStorage {
    inner: MemoryStorage,
    delay: Duration,
}

#[async_trait]
impl Storage for SlowStorage {
    async fn fetch_authors(
        &self,
        cursor: Cursor,
        filters: &FilterSet<Author>,
    ) -> Result<Vec<Author>> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch_authors(cursor, filters).await
    }

    async fn fetch_books(&self, cursor: Cursor, filters: &FilterSet<Book>) -> Result<Vec<Book>> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch_books(cursor, filters).await
    }

    async fn insert_author(&self, name: &str) -> Result<Author> {
        self.inner.insert_author(name).await
    }

    async fn insert_book(&self, book: &NewBook) -> Result<Book> {
        self.inner.insert_book(book).await
    }
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    use tower::ServiceExt;

    let request = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_request_deadline_yields_error_envelope() {
    let storage = SlowStorage {
        inner: MemoryStorage::new().with_authors(vec![Author::new(1, "Author 1")]),
        delay: Duration::from_millis(200),
    };
    let app = router(AppState::new(Arc::new(storage)), Duration::from_millis(20));

    let (status, body) = get_json(app, "/authors").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        serde_json::json!({"status_code": 500, "message": "Internal Error"})
    );
}

#[tokio::test]
async fn test_request_within_deadline_succeeds() {
    let storage = SlowStorage {
        inner: MemoryStorage::new().with_authors(vec![Author::new(1, "Author 1")]),
        delay: Duration::from_millis(5),
    };
    let app = router(AppState::new(Arc::new(storage)), Duration::from_secs(5));

    let (status, body) = get_json(app, "/authors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Author 1");
}
