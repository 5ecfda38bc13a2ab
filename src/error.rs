//! # Error Handling
//!
//! This module defines the application error type and the single place where
//! errors are turned into HTTP responses.
//!
//! ## The Error Contract
//! - Every failure, whatever stage raised it (CORS check, session load, the
//!   authentication gate, a handler), ends up as an `AppError`
//! - Structured errors carry an explicit status and a client-safe message,
//!   and are sent back unchanged
//! - Everything else becomes `500 { "error": "An unknown error occurred" }`;
//!   the details are logged server-side only

use crate::middleware::cors::CorsError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message sent for every error that is not a structured HTTP error
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Application-wide error type
///
/// Variants fall into two groups:
///
/// - **Structured** (`NotFound`, `BadRequest`, `Unauthorized`, `Conflict`, `Http`):
///   the message is written for the client and is returned as-is
/// - **Unclassified** (`Database`, `Session`, `Cors`, `PasswordHash`):
///   the message may contain internals and never leaves the server
///
/// The `#[from]` attributes let `?` convert library errors directly, e.g.
/// ```rust,ignore
/// let user: Option<String> = session.get("user_id").await?;
/// // tower_sessions::session::Error -> AppError::Session
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database errors (SQLx library errors)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session store errors (store unreachable, corrupt record)
    ///
    /// Downstream authorization depends on the session, so these are never
    /// swallowed: the request fails instead of continuing sessionless
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Request rejected by the CORS policy
    #[error("CORS error: {0}")]
    Cors(#[from] CorsError),

    /// Password hashing or hash parsing failed
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// Resource not found errors (404)
    #[error("{0}")]
    NotFound(String),

    /// Bad request errors (400)
    #[error("{0}")]
    BadRequest(String),

    /// Authentication errors (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Uniqueness conflicts (409)
    #[error("{0}")]
    Conflict(String),

    /// Any other structured HTTP error with an explicit status
    #[error("{message}")]
    Http { status: StatusCode, message: String },
}

impl AppError {
    /// Build a structured error with an arbitrary status
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Http {
            status,
            message: message.into(),
        }
    }

    /// Status and message of a structured error, `None` for unclassified ones
    pub fn as_structured(&self) -> Option<(StatusCode, &str)> {
        match self {
            AppError::NotFound(message) => Some((StatusCode::NOT_FOUND, message.as_str())),
            AppError::BadRequest(message) => Some((StatusCode::BAD_REQUEST, message.as_str())),
            AppError::Unauthorized(message) => Some((StatusCode::UNAUTHORIZED, message.as_str())),
            AppError::Conflict(message) => Some((StatusCode::CONFLICT, message.as_str())),
            AppError::Http { status, message } => Some((*status, message.as_str())),
            AppError::Database(_)
            | AppError::Session(_)
            | AppError::Cors(_)
            | AppError::PasswordHash(_) => None,
        }
    }

    /// Map an error to the (status, message) pair the client will see
    ///
    /// This is a pure function: it never looks at anything but the error.
    pub fn normalize(&self) -> (StatusCode, String) {
        match self.as_structured() {
            Some((status, message)) => (status, message.to_string()),
            None => (
                StatusCode::INTERNAL_SERVER_ERROR,
                UNKNOWN_ERROR_MESSAGE.to_string(),
            ),
        }
    }
}

/// Body parse failures keep the status axum chose (400, 413, 415, 422)
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::http(rejection.status(), rejection.body_text())
    }
}

/// Convert AppError into an HTTP response
///
/// This is the Error Normalizer: handlers and middleware return
/// `Result<_, AppError>`, and axum calls this for every `Err`.
///
/// ## How it works
/// 1. Log the error (full detail, server-side)
/// 2. Normalize it to (status, message)
/// 3. Return `{ "error": message }` with that status
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.as_structured().is_some() {
            tracing::debug!("Request failed: {}", self);
        } else {
            // Unclassified errors are only ever visible here
            tracing::error!("Unhandled error: {:?}", self);
        }

        let (status, error_message) = self.normalize();

        // Format: { "error": "error message here" }
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
