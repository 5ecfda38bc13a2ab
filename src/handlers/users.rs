//! # User Handlers
//!
//! Registration, login and logout. None of these sit behind the
//! authentication gate, since they have to work before anyone is logged in.

use crate::db::models::User;
use crate::db::users::{self, EMAIL_TAKEN, USERNAME_TAKEN};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::non_blank;
use crate::middleware::session::{current_user_id, log_in, log_out};
use crate::password::{hash_password, verify_password};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tower_sessions::Session;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogInRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

fn parameters_missing() -> AppError {
    AppError::BadRequest("Parameters missing".to_string())
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

/// Get the logged-in user's profile
///
/// ## Route
/// GET /api/users
///
/// ## Response
/// ```json
/// {
///   "_id": "550e8400-e29b-41d4-a716-446655440000",
///   "username": "alice",
///   "email": "alice@example.com",
///   "createdAt": "2024-01-15T10:30:00+00:00",
///   "updatedAt": "2024-01-15T10:30:00+00:00"
/// }
/// ```
pub async fn authenticated_user(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<User>> {
    let user_id = current_user_id(&session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

    let user = users::find_by_id(&state.db, &user_id).await?;

    Ok(Json(user))
}

/// Create an account and log it in
///
/// ## Route
/// POST /api/users/signup
///
/// ## Errors
/// - 400 when a field is missing or blank
/// - 409 when the username or email is taken
pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    AppJson(req): AppJson<SignUpRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let (Some(username), Some(email), Some(password)) = (
        non_blank(req.username),
        non_blank(req.email),
        non_blank(req.password),
    ) else {
        return Err(parameters_missing());
    };

    if users::find_by_username(&state.db, &username).await?.is_some() {
        return Err(AppError::Conflict(USERNAME_TAKEN.to_string()));
    }

    if users::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(&password)?;
    let user = users::create_user(&state.db, &username, &email, &password_hash).await?;

    log_in(&session, &user.id).await?;
    tracing::info!("Registered user {}", user.username);

    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in with username and password
///
/// ## Route
/// POST /api/users/login
///
/// Unknown usernames and wrong passwords get the same 401, so the response
/// does not reveal which accounts exist.
pub async fn log_in_user(
    State(state): State<AppState>,
    session: Session,
    AppJson(req): AppJson<LogInRequest>,
) -> AppResult<Json<User>> {
    let (Some(username), Some(password)) = (non_blank(req.username), non_blank(req.password))
    else {
        return Err(parameters_missing());
    };

    let user = users::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(invalid_credentials());
    }

    log_in(&session, &user.id).await?;
    tracing::info!("User {} logged in", user.username);

    Ok(Json(user))
}

/// End the session
///
/// ## Route
/// POST /api/users/logout
pub async fn log_out_user(session: Session) -> AppResult<StatusCode> {
    log_out(&session).await?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use crate::test_util::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn signup_logs_the_user_in() {
        let mut app = TestApp::new().await;

        let response = app.sign_up("alice", "alice@example.com", "hunter22").await;
        assert_eq!(response.body["username"], "alice");
        assert_eq!(response.body["email"], "alice@example.com");
        assert!(response.body.get("passwordHash").is_none());

        let me = app.get("/api/users").await;
        assert_eq!(me.status, StatusCode::OK);
        assert_eq!(me.body["_id"], response.body["_id"]);
    }

    #[tokio::test]
    async fn users_group_is_reachable_without_session() {
        let mut app = TestApp::new().await;

        let response = app
            .post("/api/users/login", json!({ "username": "ghost", "password": "boo" }))
            .await;

        // Reached the handler: credential check, not the gate
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body, json!({ "error": "Invalid credentials" }));
    }

    #[tokio::test]
    async fn current_user_requires_login() {
        let mut app = TestApp::new().await;

        let response = app.get("/api/users").await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body, json!({ "error": "User not authenticated" }));
    }

    #[tokio::test]
    async fn signup_with_missing_fields() {
        let mut app = TestApp::new().await;

        for body in [
            json!({ "email": "a@example.com", "password": "pw" }),
            json!({ "username": "a", "password": "pw" }),
            json!({ "username": "a", "email": "a@example.com", "password": "  " }),
        ] {
            let response = app.post("/api/users/signup", body).await;
            assert_eq!(response.status, StatusCode::BAD_REQUEST);
            assert_eq!(response.body, json!({ "error": "Parameters missing" }));
        }
    }

    #[tokio::test]
    async fn signup_rejects_duplicates() {
        let mut app = TestApp::new().await;
        app.sign_up("alice", "alice@example.com", "hunter22").await;

        let response = app
            .post(
                "/api/users/signup",
                json!({ "username": "alice", "email": "new@example.com", "password": "pw" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(
            response.body["error"],
            "Username already taken. Please choose a different one or log in instead."
        );

        let response = app
            .post(
                "/api/users/signup",
                json!({ "username": "alice2", "email": "alice@example.com", "password": "pw" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(
            response.body["error"],
            "A user with this email address already exists. Please log in instead."
        );
    }

    #[tokio::test]
    async fn login_and_logout() {
        let mut app = TestApp::new().await;
        app.sign_up("alice", "alice@example.com", "hunter22").await;

        let response = app.post("/api/users/logout", json!({})).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(app.get("/api/users").await.status, StatusCode::UNAUTHORIZED);

        let response = app
            .post("/api/users/login", json!({ "username": "alice", "password": "wrong" }))
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);

        let response = app
            .post("/api/users/login", json!({ "username": "alice", "password": "hunter22" }))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["username"], "alice");
        assert_eq!(app.get("/api/users").await.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn login_issues_a_new_session_id() {
        let mut app = TestApp::new().await;

        let anonymous = app.get("/api/users/unknown").await;
        let pre_signup = anonymous.cookie_pair().expect("anonymous session cookie");

        let signed_up = app.sign_up("alice", "alice@example.com", "hunter22").await;
        let after_signup = signed_up.cookie_pair().expect("signup cookie");
        assert_ne!(pre_signup, after_signup);

        // The cookie from before signup is not logged in
        app.set_cookie(pre_signup);
        assert_eq!(app.get("/api/users").await.status, StatusCode::UNAUTHORIZED);

        let pre_login = app.get("/api/users/unknown").await.cookie_pair().expect("cookie");
        let logged_in = app
            .post("/api/users/login", json!({ "username": "alice", "password": "hunter22" }))
            .await;
        assert_eq!(logged_in.status, StatusCode::OK);
        let after_login = logged_in.cookie_pair().expect("login cookie");
        assert_ne!(pre_login, after_login);

        app.set_cookie(pre_login);
        assert_eq!(app.get("/api/users").await.status, StatusCode::UNAUTHORIZED);

        app.set_cookie(after_login);
        assert_eq!(app.get("/api/users").await.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn body_without_json_content_type_is_415() {
        let mut app = TestApp::new().await;

        let request = axum::http::Request::post("/api/users/login")
            .body(axum::body::Body::from(
                json!({ "username": "alice", "password": "hunter22" }).to_string(),
            ))
            .unwrap();
        let response = app.send(request).await;

        assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(response.body["error"].is_string());
    }

    #[tokio::test]
    async fn malformed_json_is_a_structured_error() {
        let mut app = TestApp::new().await;

        let request = axum::http::Request::post("/api/users/login")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();
        let response = app.send(request).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body["error"].is_string());
    }

    #[tokio::test]
    async fn deleted_account_is_not_found() {
        let mut app = TestApp::new().await;
        app.sign_up("alice", "alice@example.com", "hunter22").await;

        sqlx::query("DELETE FROM users")
            .execute(&app.pool)
            .await
            .unwrap();

        let response = app.get("/api/users").await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, json!({ "error": "User not found" }));
    }
}
