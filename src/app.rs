//! # Request Pipeline
//!
//! Every request passes through the same ordered stages:
//!
//! 1. `TraceLayer`: request/response logging
//! 2. `enforce_cors`: deny disallowed origins and verbs before anything else runs
//! 3. `CorsLayer`: `Access-Control-*` headers, preflight answers
//! 4. `SessionManagerLayer` + `establish_session`: load or create the session
//! 5. Routing: `/api/users`, or `/api/notes` behind `require_auth`
//! 6. Handler, which parses the JSON body through `AppJson`
//!
//! Each stage either continues, responds, or fails with an `AppError`. All
//! failures are rendered by `AppError`'s `IntoResponse`, and anything no
//! route matches ends in the `not_found` fallback, so every request gets
//! exactly one JSON response.

use crate::handlers::{not_found, notes, users};
use crate::middleware::auth::require_auth;
use crate::middleware::cors::{cors_layer, enforce_cors};
use crate::middleware::session::establish_session;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tower_sessions::{service::SignedCookie, SessionManagerLayer, SessionStore};

/// Largest accepted request body
pub const JSON_BODY_LIMIT: usize = 100 * 1024;

/// Build the application router with the full middleware stack
pub fn build_router<S: SessionStore + Clone>(
    state: AppState,
    session_layer: SessionManagerLayer<S, SignedCookie>,
) -> Router {
    // Registration and login must work before authentication
    let user_routes = Router::new()
        .route("/", get(users::authenticated_user).fallback(not_found))
        .route("/signup", post(users::sign_up).fallback(not_found))
        .route("/login", post(users::log_in_user).fallback(not_found))
        .route("/logout", post(users::log_out_user).fallback(not_found));

    // The gate wraps the group's own fallback too, so unknown note paths
    // are still 401 for anonymous clients
    let note_routes = Router::new()
        .route(
            "/",
            get(notes::list_notes)
                .post(notes::create_note)
                .fallback(not_found),
        )
        .route(
            "/{note_id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note)
                .fallback(not_found),
        )
        .fallback(not_found)
        .layer(axum_middleware::from_fn(require_auth));

    // Layers run outermost-last: the last `.layer` sees the request first
    Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/notes", note_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .layer(axum_middleware::from_fn(establish_session))
        .layer(session_layer)
        .layer(cors_layer(&state.cors))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            enforce_cors,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
