//! # Middleware Module
//!
//! Middleware intercepts HTTP requests and responses before (or after)
//! route handlers. Each one either passes the request on, answers it, or
//! fails with an `AppError`.
//!
//! ## Our Middleware
//! - `cors`: Origin allow-list and verb restriction for cross-origin requests
//! - `session`: Session cookie, store and rolling expiry
//! - `auth`: Checks if user is logged in (guards the notes routes)

pub mod auth;
pub mod cors;
pub mod session;
