//! # Database Models
//!
//! Structs mapping rows of the `users` and `notes` tables. They serialize
//! with the field names the frontend expects (`_id`, `userId`, `createdAt`, ...).
//!
//! Timestamps are RFC 3339 strings, which SQLite stores as text and which
//! sort chronologically as plain strings.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// User account information
///
/// `password_hash` is never serialized, so a `User` can be returned from a
/// handler as-is.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (UUID v4)
    #[serde(rename = "_id")]
    pub id: String,

    /// Unique login name
    pub username: String,

    /// Unique email address
    pub email: String,

    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: String,

    pub updated_at: String,
}

impl User {
    /// Create a new user with generated ID and timestamps
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now().to_rfc3339();

        Self {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// A note, owned by exactly one user
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,

    /// Owner, foreign key to users table
    pub user_id: String,

    pub title: String,

    /// Optional body
    pub text: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

impl Note {
    pub fn new(user_id: String, title: String, text: Option<String>) -> Self {
        let now = Utc::now().to_rfc3339();

        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            title,
            text,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
