use crate::error::{AppError, AppResult};
use crate::middleware::session::USER_ID_KEY;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

/// Identity of the logged-in user, placed in request extensions by [`require_auth`]
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let user_id: Option<String> = session.get(USER_ID_KEY).await?;

    match user_id {
        Some(user_id) => {
            request
                .extensions_mut()
                .insert(AuthenticatedUser { user_id });
            Ok(next.run(request).await)
        }
        None => Err(AppError::Unauthorized("User not authenticated".to_string())),
    }
}
