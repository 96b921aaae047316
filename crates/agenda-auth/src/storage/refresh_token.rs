//! Refresh token storage trait.
//!
//! # Security Considerations
//!
//! - Rotation must be atomic: revoking the outstanding tokens of a user and
//!   inserting the replacement happen as one step, with no window in which
//!   both old and new are redeemable
//! - Marking a token used must be atomic and immediate
//! - Expired tokens should be cleaned up periodically

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::refresh_token::RefreshToken;

/// Storage trait for refresh tokens.
///
/// Implementations must uphold the single-active-token invariant: after
/// [`insert_rotated`](Self::insert_rotated) completes, the inserted token is
/// the only redeemable one for its user.
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Atomically revokes every active token for `token.user_id` and stores
    /// `token` as the user's new active token.
    ///
    /// Used both at login (replacing whatever the previous session held) and
    /// at rotation (replacing the token just consumed). Concurrent calls for
    /// the same user must serialize; exactly one token survives.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be stored.
    async fn insert_rotated(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Finds a refresh token by its opaque value.
    ///
    /// Returns the record regardless of its state; callers inspect
    /// `is_active()` and friends to decide what to do with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_value(&self, value: &str) -> AuthResult<Option<RefreshToken>>;

    /// Marks a token as consumed by rotation, setting `used_at`.
    ///
    /// Must be atomic with respect to concurrent redemption attempts: of two
    /// racing calls for the same value, at most one observes the token as
    /// previously unused. Returns the prior `used` state (`false` means this
    /// call won the race).
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not found or the operation fails.
    async fn mark_used(&self, value: &str) -> AuthResult<bool>;

    /// Revokes all tokens for a user, setting `revoked_at`.
    ///
    /// Used at logout and on credential change. Returns the number of tokens
    /// revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn revoke_by_user(&self, user_id: Uuid) -> AuthResult<u64>;

    /// Deletes a single token record by its opaque value.
    ///
    /// Called when a presented token is rejected: the record has no further
    /// use, and removing it means the dead value cannot be probed again.
    /// Returns whether a record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn delete_by_value(&self, value: &str) -> AuthResult<bool>;

    /// Deletes tokens whose expiry has passed, regardless of state.
    ///
    /// Called periodically by the sweep task to bound storage growth.
    /// Returns the number of tokens deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;

    /// Lists all active tokens for a user.
    ///
    /// After any completed login or rotation this returns at most one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn list_active_by_user(&self, user_id: Uuid) -> AuthResult<Vec<RefreshToken>>;
}
