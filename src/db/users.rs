use crate::db::unique_violation;
use crate::db::models::User;
use crate::error::{AppError, AppResult};
use sqlx::SqlitePool;

pub const USERNAME_TAKEN: &str =
    "Username already taken. Please choose a different one or log in instead.";
pub const EMAIL_TAKEN: &str =
    "A user with this email address already exists. Please log in instead.";

pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> AppResult<User> {
    let user = User::new(
        username.to_string(),
        email.to_string(),
        password_hash.to_string(),
    );

    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(pool)
    .await
    .map_err(|e| {
        // A concurrent signup can slip past the existence checks
        match unique_violation(&e) {
            Some(message) if message.contains("users.email") => {
                AppError::Conflict(EMAIL_TAKEN.to_string())
            }
            Some(_) => AppError::Conflict(USERNAME_TAKEN.to_string()),
            None => AppError::Database(e),
        }
    })?;

    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, user_id: &str) -> AppResult<User> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("User not found".to_string()),
            _ => AppError::Database(e),
        })?;

    Ok(user)
}
