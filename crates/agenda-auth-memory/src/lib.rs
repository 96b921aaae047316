//! In-memory storage backends for the Agenda auth engine.
//!
//! Suitable for development, tests, and single-process deployments. All
//! state is lost on restart; clients simply log in again.

pub mod refresh_token;
pub mod user;

pub use refresh_token::InMemoryRefreshTokenStorage;
pub use user::InMemoryUserStorage;
