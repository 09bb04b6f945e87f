// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type shared by the engine and both surfaces.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Network failure or non-success status from Strava.
    #[error("Strava transport error: {0}")]
    Transport(String),

    /// Malformed response body or malformed cached record.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Missing/unreadable credential file or failed refresh.
    #[error("Credential error: {0}")]
    Credential(String),

    /// Local I/O failure on the cache directory.
    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Substring Strava returns in the body of a rejected refresh token.
    pub const INVALID_GRANT: &'static str = "invalid_grant";

    /// True when a Strava response indicates the credential itself is bad.
    pub fn is_token_error(&self) -> bool {
        match self {
            AppError::Credential(_) => true,
            AppError::Transport(msg) => {
                msg.starts_with("HTTP 401") || msg.contains(Self::INVALID_GRANT)
            }
            _ => false,
        }
    }

    /// JSON-RPC error code for this error.
    pub fn rpc_code(&self) -> i32 {
        match self {
            AppError::BadRequest(_) => crate::mcp::error_codes::INVALID_PARAMS,
            _ => crate::mcp::error_codes::INTERNAL_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Transport(msg) => {
                (StatusCode::BAD_GATEWAY, "strava_error", Some(msg.clone()))
            }
            AppError::Decode(msg) => (StatusCode::BAD_GATEWAY, "decode_error", Some(msg.clone())),
            AppError::Credential(msg) => {
                tracing::error!(error = %msg, "Credential error");
                (StatusCode::INTERNAL_SERVER_ERROR, "credential_error", None)
            }
            AppError::Cache(msg) => {
                tracing::error!(error = %msg, "Cache error");
                (StatusCode::INTERNAL_SERVER_ERROR, "cache_error", None)
            }
            AppError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "cancelled", None),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for the engine and handlers
pub type Result<T> = std::result::Result<T, AppError>;
