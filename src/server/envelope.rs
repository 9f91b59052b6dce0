//! Uniform response envelope
//!
//! Every catalog endpoint answers with exactly one of two shapes:
//! `{status_code, data, next_page_id?}` or `{status_code, message}`.

use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Success or error body of a catalog response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Success {
        status_code: u16,
        data: T,
        #[serde(skip_serializing_if = "Option::is_none")]
        next_page_id: Option<u64>,
    },
    Error {
        status_code: u16,
        message: String,
    },
}

impl<T> Envelope<T> {
    /// 200 with no next page
    pub fn ok(data: T) -> Self {
        Self::page(data, None)
    }

    /// 200 page, optionally pointing at the next one
    pub fn page(data: T, next_page_id: Option<u64>) -> Self {
        Self::Success {
            status_code: StatusCode::OK.as_u16(),
            data,
            next_page_id,
        }
    }

    /// 201 for a created entity
    pub fn created(data: T) -> Self {
        Self::Success {
            status_code: StatusCode::CREATED.as_u16(),
            data,
            next_page_id: None,
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Error {
            status_code: status.as_u16(),
            message: message.into(),
        }
    }

    /// Map an error to its status and client-safe message.
    ///
    /// Server-side failures are logged here with their full cause.
    pub fn from_error(err: &Error) -> Self {
        if !err.is_client_error() {
            tracing::error!(error = %err, "request failed");
        }
        Self::Error {
            status_code: err.status_code(),
            message: err.client_message(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success { status_code, .. } | Self::Error { status_code, .. } => *status_code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Data of a success envelope
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Error { .. } => None,
        }
    }

    pub fn next_page_id(&self) -> Option<u64> {
        match self {
            Self::Success { next_page_id, .. } => *next_page_id,
            Self::Error { .. } => None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
