use crate::db::models::Note;
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sqlx::SqlitePool;

pub const NOTE_NOT_FOUND: &str = "Note not found";

pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> AppResult<Vec<Note>> {
    let notes = sqlx::query_as::<_, Note>(
        "SELECT * FROM notes
         WHERE user_id = ?
         ORDER BY created_at ASC, rowid ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(notes)
}

pub async fn find_by_id(pool: &SqlitePool, note_id: &str) -> AppResult<Note> {
    let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ?")
        .bind(note_id)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound(NOTE_NOT_FOUND.to_string()),
            _ => AppError::Database(e),
        })?;

    Ok(note)
}

pub async fn create_note(
    pool: &SqlitePool,
    user_id: &str,
    title: &str,
    text: Option<&str>,
) -> AppResult<Note> {
    let note = Note::new(
        user_id.to_string(),
        title.to_string(),
        text.map(str::to_string),
    );

    sqlx::query(
        "INSERT INTO notes (id, user_id, title, text, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&note.id)
    .bind(&note.user_id)
    .bind(&note.title)
    .bind(&note.text)
    .bind(&note.created_at)
    .bind(&note.updated_at)
    .execute(pool)
    .await?;

    Ok(note)
}

pub async fn update_note(
    pool: &SqlitePool,
    note_id: &str,
    title: &str,
    text: Option<&str>,
) -> AppResult<Note> {
    let result = sqlx::query(
        "UPDATE notes SET title = ?, text = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(title)
    .bind(text)
    .bind(Utc::now().to_rfc3339())
    .bind(note_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(NOTE_NOT_FOUND.to_string()));
    }

    find_by_id(pool, note_id).await
}

pub async fn delete_note(pool: &SqlitePool, note_id: &str) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM notes WHERE id = ?")
        .bind(note_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(NOTE_NOT_FOUND.to_string()));
    }

    Ok(())
}
