//! # HTTP Request Handlers
//!
//! This module contains all the HTTP route handlers (controllers).
//! Each handler processes a specific API endpoint.
//!
//! ## Submodules
//! - `users`: Account endpoints (signup, login, logout, current user)
//! - `notes`: Note CRUD, only reachable through the authentication gate
//!
//! ## Handler Pattern
//! Handlers are async functions that:
//! 1. Extract data from request (path params, JSON body, session, authenticated user)
//! 2. Call database operations
//! 3. Return a response, or an `AppError` that the error handler turns into JSON
//!
//! ```rust,ignore
//! pub async fn my_handler(
//!     State(state): State<AppState>,   // Shared app state
//!     AppJson(req): AppJson<MyRequest>, // JSON request body
//! ) -> AppResult<Json<MyResponse>> {
//!     Ok(Json(response))
//! }
//! ```

pub mod notes;
pub mod users;

use crate::error::AppError;

pub const ENDPOINT_NOT_FOUND: &str = "Endpoint not found";

/// Fallback for every path or method no route matched
pub async fn not_found() -> AppError {
    AppError::NotFound(ENDPOINT_NOT_FOUND.to_string())
}

/// Treat blank strings like missing ones
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
