//! Authentication and session security engine for the Agenda server.
//!
//! Provides everything between "a request arrived" and "this is user X":
//!
//! - **Rate limiting** - per-client-key token buckets guarding login
//! - **Access tokens** - short-lived HS256 JWTs with issuer, audience, and
//!   clock-skew validation
//! - **Refresh tokens** - opaque, one-time-use, rotating values with a
//!   single active token per user
//! - **Sessions** - one server-side session per user; a new login evicts
//!   the old session and redirects it to a session-expired endpoint
//! - **Anti-forgery** - double-submit cookie/header verification
//! - **Orchestration** - [`service::AuthService`] wires the pieces into the
//!   fixed login pipeline
//!
//! Storage is abstracted behind the traits in [`storage`]; see the
//! `agenda-auth-memory` crate for the in-process implementation.

pub mod config;
pub mod csrf;
pub mod error;
pub mod http;
pub mod middleware;
pub mod password;
pub mod rate_limit;
pub mod service;
pub mod session;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{AuthConfig, ConfigError, RateLimitConfig};
pub use error::{AuthError, AuthResult};
pub use rate_limit::RateLimiter;
pub use service::{AuthService, IssuedTokens, LoginOutcome, RefreshOutcome};
pub use session::{Session, SessionLookup, SessionRegistry};
pub use storage::{RefreshTokenStorage, UserStorage};
pub use token::jwt::JwtService;
pub use token::refresh::RefreshTokenService;
pub use types::{RefreshToken, User};
