//! User account domain type.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A registered user account.
///
/// The password hash is an encoded Argon2id string and never leaves the
/// server; the type is deliberately not serialized with it by default.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,

    /// Login name, unique across all accounts.
    pub username: String,

    /// Encoded Argon2id password hash.
    pub password_hash: String,

    /// When the account was created.
    pub created_at: OffsetDateTime,
}

impl User {
    /// Creates a new account with the given username and password hash.
    #[must_use]
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Public view of the account, safe to serialize in responses.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Serializable view of a user without credential material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Unique identifier.
    pub id: Uuid,

    /// Login name.
    pub username: String,
}
