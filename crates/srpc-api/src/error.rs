//! # RPC Errors
//!
//! Request-local failures normalized into error envelopes. Only decode and
//! validation failures are expected per-request outcomes; `Internal` covers
//! a bound function whose declared schema disagrees with its Rust types.
//! Its detail is logged and never returned to the client.
//!
//! Errors returned by the bound function itself are not represented here.
//! They are passed through to axum unchanged (see [`crate::binder`]).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use srpc_schema::ValidationFailure;
use thiserror::Error;

use crate::envelope::{ErrorPayload, Reply};

/// Failure converted to an error envelope by the binder.
#[derive(Error, Debug)]
pub enum RpcError {
    /// Request body is missing or not parseable JSON (400).
    #[error("invalid request body: {0}")]
    Decode(String),

    /// Body does not conform to the input schema (400).
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    /// Schema/type disagreement or unserializable output (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl RpcError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Decode(_) => (StatusCode::BAD_REQUEST, "DECODE_ERROR"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Label used for the request outcome metric.
    pub(crate) fn outcome(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode_error",
            Self::Validation(_) => "validation_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Client-facing payload; internal details are withheld.
    pub fn payload(&self) -> ErrorPayload {
        let (_, code) = self.status_and_code();
        let message = match self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };
        ErrorPayload::with_code(code, message)
    }

    pub fn reply(&self) -> Reply {
        let (status, _) = self.status_and_code();
        Reply::from(self.payload()).with_status(status)
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal rpc error"),
            _ => tracing::warn!(error = %self, "rejected rpc request"),
        }
        self.reply().into_response()
    }
}
