//! Request handlers
//!
//! decode cursor → resolve filters → fetch → next cursor → envelope

use super::envelope::Envelope;
use super::AppState;
use crate::error::{Error, Result};
use crate::filter::{FilterSet, Filterable};
use crate::pagination::Cursor;
use crate::storage::Storage;
use crate::types::{Author, Book, CreateBookRequest, QueryParams};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// A listable resource and the storage call that pages it
#[async_trait]
pub trait PageSource: Filterable + Serialize + Send + Sync {
    async fn fetch_page(
        storage: &dyn Storage,
        cursor: Cursor,
        filters: &FilterSet<Self>,
    ) -> Result<Vec<Self>>;
}

#[async_trait]
impl PageSource for Author {
    async fn fetch_page(
        storage: &dyn Storage,
        cursor: Cursor,
        filters: &FilterSet<Self>,
    ) -> Result<Vec<Self>> {
        storage.fetch_authors(cursor, filters).await
    }
}

#[async_trait]
impl PageSource for Book {
    async fn fetch_page(
        storage: &dyn Storage,
        cursor: Cursor,
        filters: &FilterSet<Self>,
    ) -> Result<Vec<Self>> {
        storage.fetch_books(cursor, filters).await
    }
}

/// Produce one page of `T` for a request's query parameters
pub async fn list<T: PageSource>(state: &AppState, params: &QueryParams) -> Envelope<Vec<T>> {
    let cursor = match state.decoder.decode(params) {
        Ok(cursor) => cursor,
        Err(err) => return Envelope::from_error(&err),
    };
    let filters = FilterSet::<T>::from_params(params);

    match T::fetch_page(state.storage.as_ref(), cursor, &filters).await {
        Ok(rows) => {
            let next_page_id = state.next_page.next_page_id(cursor, rows.len());
            Envelope::page(rows, next_page_id)
        }
        Err(err) => Envelope::from_error(&err),
    }
}

/// Decode, validate and store a new book
pub async fn create(state: &AppState, body: &[u8]) -> Envelope<Book> {
    let request = match serde_json::from_slice::<CreateBookRequest>(body) {
        Ok(request) => request,
        Err(err) => return Envelope::from_error(&Error::InvalidRequestBody(err)),
    };
    let new_book = match request.validate() {
        Ok(new_book) => new_book,
        Err(err) => return Envelope::from_error(&err),
    };

    match state.storage.insert_book(&new_book).await {
        Ok(book) => Envelope::created(book),
        Err(err) => Envelope::from_error(&err),
    }
}

fn query_params(
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> std::result::Result<QueryParams, Envelope<()>> {
    query
        .map(|Query(pairs)| QueryParams::from(pairs))
        .map_err(|rejection| {
            Envelope::error(
                StatusCode::BAD_REQUEST,
                format!("Invalid query string: {rejection}"),
            )
        })
}

// ============================================================================
// Axum handlers
// ============================================================================

/// `GET /authors`
pub async fn list_authors(
    State(state): State<AppState>,
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> axum::response::Response {
    match query_params(query) {
        Ok(params) => list::<Author>(&state, &params).await.into_response(),
        Err(envelope) => envelope.into_response(),
    }
}

/// `GET /books`
pub async fn list_books(
    State(state): State<AppState>,
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> axum::response::Response {
    match query_params(query) {
        Ok(params) => list::<Book>(&state, &params).await.into_response(),
        Err(envelope) => envelope.into_response(),
    }
}

/// `POST /books`
pub async fn create_book(State(state): State<AppState>, body: Bytes) -> Envelope<Book> {
    create(&state, &body).await
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
