//! # Database Module
//!
//! This module organizes all database-related code into submodules:
//! - `models`: Data structures (User, Note)
//! - `users`: Operations on user accounts
//! - `notes`: CRUD operations for notes
//!
//! The schema lives in `./migrations` and is embedded at compile time.

pub mod models;
pub mod notes;
pub mod users;

use sqlx::migrate::MigrateError;
use sqlx::SqlitePool;

/// Apply all pending schema migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Message of a UNIQUE constraint violation, `None` for any other error
///
/// SQLite names the column, e.g. `UNIQUE constraint failed: users.email`.
pub(crate) fn unique_violation(error: &sqlx::Error) -> Option<&str> {
    error
        .as_database_error()
        .filter(|e| e.is_unique_violation())
        .map(|e| e.message())
}
