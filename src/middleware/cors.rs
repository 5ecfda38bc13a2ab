//! # CORS Policy
//!
//! Cross-origin access is decided by a fixed allow-list of origins:
//! - No `Origin` header (same-origin or non-browser client): allowed
//! - `Origin` exactly equal to an allow-list entry: allowed
//! - Anything else: denied
//!
//! Matching is exact string comparison. Browsers never send a trailing slash
//! in `Origin`, so an allow-list entry that ends with `/` can never match.
//!
//! Two pieces work together:
//! - [`enforce_cors`] runs first and rejects denied requests before they reach
//!   the session layer or any handler
//! - [`cors_layer`] adds the `Access-Control-*` headers for allowed origins

use crate::error::AppResult;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, request::Parts, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use thiserror::Error;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

/// Origins allowed to make credentialed cross-origin requests
///
/// The second entry keeps its trailing slash and is therefore unreachable.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = [
    "http://localhost:3000",
    "https://notes-app-frontend-phi.vercel.app/",
];

/// The only verbs allowed cross-origin
pub const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorsError {
    #[error("origin {0:?} is not allowed by CORS")]
    OriginNotAllowed(String),

    #[error("method {0} is not allowed by CORS")]
    MethodNotAllowed(String),

    #[error("Origin header is not valid UTF-8")]
    MalformedOrigin,
}

/// Immutable allow-list, built once at startup
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_origins: origins.into_iter().map(Into::into).collect(),
        }
    }

    /// The origin decision: `Ok` to allow, an error value to deny
    pub fn decide(&self, origin: Option<&str>) -> Result<(), CorsError> {
        match origin {
            None => Ok(()),
            Some(origin) if self.allowed_origins.iter().any(|o| o == origin) => Ok(()),
            Some(origin) => Err(CorsError::OriginNotAllowed(origin.to_string())),
        }
    }

    pub fn allows(&self, origin: Option<&str>) -> bool {
        self.decide(origin).is_ok()
    }

    /// Full check for one request: origin first, then the verb.
    ///
    /// The verb restriction applies to cross-origin requests only. For a
    /// preflight the verb checked is the one named in
    /// `Access-Control-Request-Method`.
    pub fn check_request(
        &self,
        origin: Option<&str>,
        method: &Method,
        preflight_method: Option<&str>,
    ) -> Result<(), CorsError> {
        self.decide(origin)?;

        if origin.is_none() {
            return Ok(());
        }

        let effective = match preflight_method {
            Some(requested) if *method == Method::OPTIONS => requested,
            _ => method.as_str(),
        };

        if ALLOWED_METHODS.iter().any(|m| m.as_str() == effective) {
            Ok(())
        } else {
            Err(CorsError::MethodNotAllowed(effective.to_string()))
        }
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_ORIGINS)
    }
}

/// Reject requests the policy denies
///
/// The error is unclassified, so the client gets a generic 500 without any
/// CORS headers and the browser blocks the response.
pub async fn enforce_cors(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let headers = request.headers();

    let origin = headers
        .get(header::ORIGIN)
        .map(|value| value.to_str().map_err(|_| CorsError::MalformedOrigin))
        .transpose()?;

    let preflight_method = headers
        .get(header::ACCESS_CONTROL_REQUEST_METHOD)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = state
        .cors
        .check_request(origin, request.method(), preflight_method)
    {
        tracing::warn!("Rejected cross-origin request to {}: {}", request.uri(), e);
        return Err(e.into());
    }

    Ok(next.run(request).await)
}

/// Header-emitting half of the policy
pub fn cors_layer(policy: &CorsPolicy) -> CorsLayer {
    let policy = policy.clone();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|origin| policy.allows(Some(origin)))
                    .unwrap_or(false)
            },
        ))
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
