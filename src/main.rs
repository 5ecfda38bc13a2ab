//! # Notes Server
//!
//! HTTP backend for a notes application: user registration and login with
//! server-side sessions, and per-user CRUD over notes.
//!
//! ## Key Concepts
//! - **Sessions**: the browser holds a signed cookie, the session record lives in SQLite
//! - **CORS allow-list**: only known frontends may make credentialed cross-origin calls
//! - **Error envelope**: every failure is answered with `{ "error": "..." }`

// Module declarations - organize code into logical components
mod app;         // Router and middleware stack
mod config;      // Configuration management (environment variables, settings)
mod db;          // Database operations (users, notes)
mod error;       // Error handling and the JSON error envelope
mod extract;     // Request extractors
mod handlers;    // HTTP request handlers (routes)
mod middleware;  // CORS, sessions, authentication gate
mod password;    // Password hashing
mod state;       // Shared application state

#[cfg(test)]
mod test_util;

use crate::config::Config;
use crate::middleware::session::{manager_layer, spawn_expired_session_cleanup, SessionSettings};
use crate::state::AppState;
use tokio::signal;
// SQLite-backed session storage
use tower_sessions_sqlx_store::SqliteStore;
// Structured logging setup
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when `RUST_LOG` is not set
///
/// `TraceLayer` emits its per-request events at debug level under the
/// `tower_http` target.
const DEFAULT_LOG_FILTER: &str = "info,notes_server=debug,tower_http=debug";

/// Main application entry point
///
/// This function:
/// 1. Sets up logging
/// 2. Loads and validates configuration (fails fast on missing secrets)
/// 3. Connects to the database and applies migrations
/// 4. Prepares the session store and its cleanup task
/// 5. Builds the router and serves until Ctrl+C / SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default: info level for most crates, debug level for our app and the
    // request log. Can be overridden with RUST_LOG environment variable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config);

    let app_state = AppState::new(&config).await?;
    tracing::info!("Application state initialized");

    // Session records share the application database
    let session_store = SqliteStore::new(app_state.db.clone());
    // Run migrations to create session tables
    session_store.migrate().await?;

    spawn_expired_session_cleanup(session_store.clone());

    let session_settings = SessionSettings::from_config(&config)?;
    let app = app::build_router(app_state, manager_layer(session_store, &session_settings));

    let bind_addr = config.bind_address();
    tracing::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
