//! In-memory refresh token storage.
//!
//! A single `RwLock` over the token table gives the atomicity the trait
//! demands: `insert_rotated` holds the write guard across both the revoke
//! sweep and the insert, so no reader can observe a moment where the old
//! and new token are both redeemable.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use agenda_auth::error::{AuthError, AuthResult};
use agenda_auth::storage::RefreshTokenStorage;
use agenda_auth::types::RefreshToken;

/// Token table keyed by opaque value.
#[derive(Default)]
pub struct InMemoryRefreshTokenStorage {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records, any state. For tests and diagnostics.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Returns `true` if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl RefreshTokenStorage for InMemoryRefreshTokenStorage {
    async fn insert_rotated(&self, token: &RefreshToken) -> AuthResult<()> {
        let now = OffsetDateTime::now_utc();
        let mut tokens = self.tokens.write().await;

        for existing in tokens.values_mut() {
            if existing.user_id == token.user_id && existing.revoked_at.is_none() {
                existing.revoked_at = Some(now);
            }
        }
        tokens.insert(token.value.clone(), token.clone());
        Ok(())
    }

    async fn find_by_value(&self, value: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self.tokens.read().await.get(value).cloned())
    }

    async fn mark_used(&self, value: &str) -> AuthResult<bool> {
        let mut tokens = self.tokens.write().await;
        let token = tokens
            .get_mut(value)
            .ok_or_else(|| AuthError::storage("refresh token disappeared during rotation"))?;

        let was_used = token.used_at.is_some();
        if !was_used {
            token.used_at = Some(OffsetDateTime::now_utc());
        }
        Ok(was_used)
    }

    async fn revoke_by_user(&self, user_id: Uuid) -> AuthResult<u64> {
        let now = OffsetDateTime::now_utc();
        let mut tokens = self.tokens.write().await;

        let mut revoked = 0;
        for token in tokens.values_mut() {
            if token.user_id == user_id && token.revoked_at.is_none() {
                token.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn delete_by_value(&self, value: &str) -> AuthResult<bool> {
        Ok(self.tokens.write().await.remove(value).is_some())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = OffsetDateTime::now_utc();
        let mut tokens = self.tokens.write().await;

        let before = tokens.len();
        tokens.retain(|_, token| !token.is_expired_at(now));
        Ok((before - tokens.len()) as u64)
    }

    async fn list_active_by_user(&self, user_id: Uuid) -> AuthResult<Vec<RefreshToken>> {
        Ok(self
            .tokens
            .read()
            .await
            .values()
            .filter(|t| t.user_id == user_id && t.is_active())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn token_for(user_id: Uuid) -> RefreshToken {
        RefreshToken::issue(user_id, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = InMemoryRefreshTokenStorage::new();
        let token = token_for(Uuid::new_v4());

        store.insert_rotated(&token).await.unwrap();
        let found = store.find_by_value(&token.value).await.unwrap().unwrap();
        assert_eq!(found.id, token.id);
        assert!(found.is_active());
    }

    #[tokio::test]
    async fn find_unknown_is_none() {
        let store = InMemoryRefreshTokenStorage::new();
        assert!(store.find_by_value("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_rotated_revokes_previous_tokens() {
        let store = InMemoryRefreshTokenStorage::new();
        let user = Uuid::new_v4();

        let first = token_for(user);
        let second = token_for(user);
        store.insert_rotated(&first).await.unwrap();
        store.insert_rotated(&second).await.unwrap();

        let old = store.find_by_value(&first.value).await.unwrap().unwrap();
        assert!(old.is_revoked());

        let active = store.list_active_by_user(user).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);
    }

    #[tokio::test]
    async fn rotation_does_not_touch_other_users() {
        let store = InMemoryRefreshTokenStorage::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let alice_token = token_for(alice);
        let bob_token = token_for(bob);
        store.insert_rotated(&alice_token).await.unwrap();
        store.insert_rotated(&bob_token).await.unwrap();
        store.insert_rotated(&token_for(alice)).await.unwrap();

        let bobs = store.find_by_value(&bob_token.value).await.unwrap().unwrap();
        assert!(bobs.is_active());
    }

    #[tokio::test]
    async fn mark_used_reports_prior_state() {
        let store = InMemoryRefreshTokenStorage::new();
        let token = token_for(Uuid::new_v4());
        store.insert_rotated(&token).await.unwrap();

        assert!(!store.mark_used(&token.value).await.unwrap());
        assert!(store.mark_used(&token.value).await.unwrap());

        let found = store.find_by_value(&token.value).await.unwrap().unwrap();
        assert!(found.is_used());
    }

    #[tokio::test]
    async fn mark_used_on_missing_token_errors() {
        let store = InMemoryRefreshTokenStorage::new();
        assert!(store.mark_used("missing").await.is_err());
    }

    #[tokio::test]
    async fn revoke_by_user_counts_only_live_tokens() {
        let store = InMemoryRefreshTokenStorage::new();
        let user = Uuid::new_v4();

        store.insert_rotated(&token_for(user)).await.unwrap();
        let current = token_for(user);
        store.insert_rotated(&current).await.unwrap();

        // Only the current token is unrevoked at this point.
        assert_eq!(store.revoke_by_user(user).await.unwrap(), 1);
        assert_eq!(store.revoke_by_user(user).await.unwrap(), 0);
        assert!(store.list_active_by_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_by_value_removes_the_record() {
        let store = InMemoryRefreshTokenStorage::new();
        let token = token_for(Uuid::new_v4());
        store.insert_rotated(&token).await.unwrap();

        assert!(store.delete_by_value(&token.value).await.unwrap());
        assert!(store.find_by_value(&token.value).await.unwrap().is_none());
        // Already gone; reports nothing removed.
        assert!(!store.delete_by_value(&token.value).await.unwrap());
    }

    #[tokio::test]
    async fn cleanup_deletes_only_expired_records() {
        let store = InMemoryRefreshTokenStorage::new();
        let user = Uuid::new_v4();

        let mut expired = token_for(user);
        expired.expires_at = OffsetDateTime::now_utc() - time::Duration::minutes(1);
        store.insert_rotated(&expired).await.unwrap();

        let live = token_for(user);
        store.insert_rotated(&live).await.unwrap();

        assert_eq!(store.cleanup_expired().await.unwrap(), 1);
        assert_eq!(store.len().await, 1);
        assert!(store.find_by_value(&live.value).await.unwrap().is_some());
    }
}
