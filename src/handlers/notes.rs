//! # Note Handlers
//!
//! CRUD over the logged-in user's notes. Every route in this group runs
//! behind `require_auth`, which supplies the [`AuthenticatedUser`].

use crate::db::models::Note;
use crate::db::notes;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::non_blank;
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Body of create and update requests
#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub title: Option<String>,
    pub text: Option<String>,
}

impl NoteRequest {
    fn into_fields(self) -> AppResult<(String, Option<String>)> {
        let title = non_blank(self.title)
            .ok_or_else(|| AppError::BadRequest("Note must have a title".to_string()))?;
        Ok((title, self.text))
    }
}

fn parse_note_id(raw: &str) -> AppResult<String> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| AppError::BadRequest("Invalid note id".to_string()))
}

/// Load a note and check that `user` owns it
async fn owned_note(pool: &SqlitePool, raw_id: &str, user: &AuthenticatedUser) -> AppResult<Note> {
    let note_id = parse_note_id(raw_id)?;
    let note = notes::find_by_id(pool, &note_id).await?;

    if note.user_id != user.user_id {
        return Err(AppError::Unauthorized(
            "You cannot access this note".to_string(),
        ));
    }

    Ok(note)
}

/// GET /api/notes
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Note>>> {
    let notes = notes::list_for_user(&state.db, &user.user_id).await?;
    Ok(Json(notes))
}

/// GET /api/notes/{note_id}
pub async fn get_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(note_id): Path<String>,
) -> AppResult<Json<Note>> {
    let note = owned_note(&state.db, &note_id, &user).await?;
    Ok(Json(note))
}

/// POST /api/notes
pub async fn create_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(req): AppJson<NoteRequest>,
) -> AppResult<(StatusCode, Json<Note>)> {
    let (title, text) = req.into_fields()?;

    let note = notes::create_note(&state.db, &user.user_id, &title, text.as_deref()).await?;

    Ok((StatusCode::CREATED, Json(note)))
}

/// PUT /api/notes/{note_id}
///
/// Replaces title and text; a missing `text` clears it.
pub async fn update_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(note_id): Path<String>,
    AppJson(req): AppJson<NoteRequest>,
) -> AppResult<Json<Note>> {
    let note = owned_note(&state.db, &note_id, &user).await?;
    let (title, text) = req.into_fields()?;

    let note = notes::update_note(&state.db, &note.id, &title, text.as_deref()).await?;

    Ok(Json(note))
}

/// DELETE /api/notes/{note_id}
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(note_id): Path<String>,
) -> AppResult<StatusCode> {
    let note = owned_note(&state.db, &note_id, &user).await?;

    notes::delete_note(&state.db, &note.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
