//! Axum integration: extractors, middleware, and error responses.

pub mod auth;
pub mod client_key;
pub mod csrf;
pub mod error;
pub mod session;
pub mod types;

pub use auth::{AuthState, BearerAuth};
pub use client_key::ClientKey;
pub use csrf::csrf_guard;
pub use session::{ActiveSession, OptionalSessionId, SESSION_COOKIE_NAME};
pub use types::AuthContext;
