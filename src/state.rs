//! # Application State
//!
//! This module defines the shared state that's accessible to all request handlers
//! and middleware. Axum clones the state for each request, which is cheap:
//! the pool is already a handle and the CORS policy sits behind an `Arc`.

use crate::config::Config;
use crate::middleware::cors::CorsPolicy;
use anyhow::Result;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;

/// Shared application state
///
/// Nothing in here is mutated after startup. The database (and through it
/// the session store) is the only shared mutable resource, and it does its
/// own coordination.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Allow-list used by the CORS middleware
    pub cors: Arc<CorsPolicy>,
}

impl AppState {
    /// Initialize application state
    ///
    /// Connects to the database and applies the schema migrations.
    ///
    /// # Errors
    /// Returns an error if the connection or a migration fails
    pub async fn new(config: &Config) -> Result<Self> {
        let db = SqlitePool::connect(&config.database_url).await?;

        crate::db::run_migrations(&db).await?;

        let cors = CorsPolicy::new(config.allowed_origins.iter().cloned());

        Ok(Self::from_parts(db, cors))
    }

    pub fn from_parts(db: SqlitePool, cors: CorsPolicy) -> Self {
        AppState {
            db,
            cors: Arc::new(cors),
        }
    }
}
