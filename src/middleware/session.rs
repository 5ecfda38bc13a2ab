//! # Sessions
//!
//! Sessions are stored server-side; the client only holds a signed cookie
//! with the session id.
//!
//! - Every request gets a session. A request without a valid cookie gets a
//!   new record saved immediately, even before anyone logs in
//! - Expiry is one hour of inactivity. Each request pushes it to
//!   `now + 1 hour` and re-sends the cookie
//! - A store failure fails the request (500) instead of continuing
//!   without a session

use crate::config::{Config, ConfigError};
use crate::error::AppResult;
use axum::{extract::Request, middleware::Next, response::Response};
use chrono::Utc;
use time::Duration;
use tokio::task::JoinHandle;
use tower_sessions::{
    cookie::{Key, SameSite},
    service::SignedCookie,
    ExpiredDeletion, Expiry, Session, SessionManagerLayer, SessionStore,
};

pub const SESSION_COOKIE_NAME: &str = "notes.sid";

/// Authenticated-user marker
pub const USER_ID_KEY: &str = "user_id";

/// Set when a session is first established
pub const CREATED_AT_KEY: &str = "created_at";

pub const SESSION_TTL: Duration = Duration::hours(1);

/// How often expired records are purged from the store
pub const CLEANUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(600);

/// Cookie settings derived from configuration
#[derive(Clone)]
pub struct SessionSettings {
    key: Key,
    secure: bool,
}

impl SessionSettings {
    pub fn new(key: Key, secure: bool) -> Self {
        Self { key, secure }
    }

    /// Derive the cookie signing key from `SESSION_SECRET`
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let key = Key::try_from(config.session_secret.as_bytes()).map_err(|e| {
            ConfigError::InvalidValue {
                name: "SESSION_SECRET".to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self::new(key, config.cookie_secure))
    }
}

/// Build the session layer over any store
///
/// Production uses the SQLite store, tests use `MemoryStore`.
pub fn manager_layer<S: SessionStore + Clone>(
    store: S,
    settings: &SessionSettings,
) -> SessionManagerLayer<S, SignedCookie> {
    // Cross-site cookies need SameSite=None, which browsers only accept on Secure cookies
    let same_site = if settings.secure {
        SameSite::None
    } else {
        SameSite::Lax
    };

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_path("/")
        .with_http_only(true)
        .with_secure(settings.secure)
        .with_same_site(same_site)
        .with_expiry(Expiry::OnInactivity(SESSION_TTL))
        .with_always_save(true)
        .with_signed(settings.key.clone())
}

/// Load the session and establish a record for first-time visitors
///
/// Reading the session forces the store lookup here, so an unreachable
/// store surfaces as an error before routing.
pub async fn establish_session(
    session: Session,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let established: Option<String> = session.get(CREATED_AT_KEY).await?;

    if established.is_none() {
        session
            .insert(CREATED_AT_KEY, Utc::now().to_rfc3339())
            .await?;
        session.save().await?;
        tracing::debug!("Established new session {:?}", session.id());
    }

    Ok(next.run(request).await)
}

/// User id of the logged-in user, if any
pub async fn current_user_id(session: &Session) -> AppResult<Option<String>> {
    Ok(session.get(USER_ID_KEY).await?)
}

/// Mark the session as belonging to `user_id`
///
/// The session gets a fresh id first, so a cookie handed out before login
/// never becomes an authenticated one.
pub async fn log_in(session: &Session, user_id: &str) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await?;
    Ok(())
}

/// Destroy the session record; the cookie is removed on the way out
pub async fn log_out(session: &Session) -> AppResult<()> {
    session.flush().await?;
    Ok(())
}

/// Periodically delete expired session records
pub fn spawn_expired_session_cleanup<S>(store: S) -> JoinHandle<()>
where
    S: ExpiredDeletion + Clone,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            tracing::debug!("Running expired session cleanup");
            if let Err(e) = store.delete_expired().await {
                tracing::error!("Session cleanup failed: {:?}", e);
            }
        }
    })
}
