//! Refresh token domain type.
//!
//! Refresh tokens are opaque server-tracked values that let a client obtain
//! a new access token without re-entering credentials. They rotate on every
//! use: presenting a token consumes it and yields a replacement, so each
//! value works exactly once.
//!
//! # Lifecycle
//!
//! A token record moves through at most one of three terminal states:
//! expired (clock passed `expires_at`), used (`used_at` set by rotation),
//! or revoked (`revoked_at` set by logout or by issuing a new session).
//! Only a record in none of those states can be redeemed.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::token::generate_opaque;

/// Number of random bytes in a refresh token value.
const REFRESH_TOKEN_BYTES: usize = 32;

/// A stored refresh token record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    /// Unique identifier for this record.
    pub id: Uuid,

    /// The opaque token value presented by the client.
    pub value: String,

    /// User this token belongs to.
    pub user_id: Uuid,

    /// When this token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When this token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When this token was consumed by rotation (None = not yet used).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub used_at: Option<OffsetDateTime>,

    /// When this token was revoked (None = not revoked).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub revoked_at: Option<OffsetDateTime>,
}

impl RefreshToken {
    /// Creates a fresh token for `user_id` with a random value, expiring
    /// `lifetime` from now.
    #[must_use]
    pub fn issue(user_id: Uuid, lifetime: std::time::Duration) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            value: generate_opaque(REFRESH_TOKEN_BYTES),
            user_id,
            created_at: now,
            expires_at: now + lifetime,
            used_at: None,
            revoked_at: None,
        }
    }

    /// Returns `true` if this token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    /// Returns `true` if this token is expired as of `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now > self.expires_at
    }

    /// Returns `true` if this token was already consumed by rotation.
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Returns `true` if this token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns `true` if this token can still be redeemed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_expired() && !self.is_used() && !self.is_revoked()
    }
}
