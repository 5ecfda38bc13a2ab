//! JSON body extraction with the application's error envelope.

use crate::error::AppError;
use axum::extract::FromRequest;

/// `axum::Json` whose rejections become [`AppError`]
///
/// Malformed bodies, a wrong content type or an oversized payload are
/// reported as `{ "error": ... }` with axum's status (400, 415, 413, 422).
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
