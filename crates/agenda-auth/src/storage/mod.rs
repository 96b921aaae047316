//! Storage traits for authentication data.
//!
//! The engine is storage-agnostic: implementations live in separate crates
//! (e.g. `agenda-auth-memory`) and are injected behind `Arc<dyn Trait>`.

pub mod refresh_token;
pub mod user;

pub use refresh_token::RefreshTokenStorage;
pub use user::UserStorage;
