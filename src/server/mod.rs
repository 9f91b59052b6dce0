//! HTTP server for the catalog
//!
//! Routes:
//!
//! - `GET /authors?limit=&page_id=&name=`
//! - `GET /books?limit=&page_id=&name=&publication_year=`
//! - `POST /books`
//! - `GET /health`

mod envelope;
mod handlers;

pub use envelope::Envelope;
pub use handlers::{create, list, PageSource};

use crate::config::AppConfig;
use crate::database::DatabaseEngine;
use crate::error::{Error, Result, INTERNAL_ERROR_MESSAGE};
use crate::pagination::{CursorDecoder, NextPagePolicy};
use crate::storage::Storage;
use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{BoxError, Router};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    storage: Arc<dyn Storage>,
    decoder: CursorDecoder,
    next_page: NextPagePolicy,
}

impl AppState {
    /// State with the default page limit and next-page policy
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            decoder: CursorDecoder::default(),
            next_page: NextPagePolicy::default(),
        }
    }

    /// State configured from `config`
    pub fn from_config(storage: Arc<dyn Storage>, config: &AppConfig) -> Result<Self> {
        Ok(Self {
            storage,
            decoder: config.cursor_decoder()?,
            next_page: config.next_page,
        })
    }

    pub fn with_decoder(mut self, decoder: CursorDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_next_page_policy(mut self, policy: NextPagePolicy) -> Self {
        self.next_page = policy;
        self
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}

/// Build the router with request-id, tracing, panic and deadline layers
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/authors", get(handlers::list_authors))
        .route(
            "/books",
            get(handlers::list_books).post(handlers::create_book),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(HandleErrorLayer::new(middleware_error_response))
                .timeout(request_timeout),
        )
        .with_state(state)
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    Envelope::<()>::error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        .into_response()
}

/// A request that outlived its deadline is a storage-class failure
async fn middleware_error_response(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::error!("request exceeded its deadline");
    } else {
        tracing::error!(error = %err, "middleware failure");
    }
    Envelope::<()>::error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        .into_response()
}

/// Open the configured database, create the schema and serve until Ctrl-C
pub async fn serve(config: AppConfig) -> Result<()> {
    config.validate()?;

    let engine = DatabaseEngine::open_with_schema(&config.database).await?;
    let state = AppState::from_config(Arc::new(engine), &config)?;
    let app = router(state, config.request_timeout);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {}: {e}", config.port)))?;

    tracing::info!("Server active on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests;
