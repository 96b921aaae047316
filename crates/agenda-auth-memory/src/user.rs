//! In-memory user account storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use agenda_auth::error::{AuthError, AuthResult};
use agenda_auth::storage::UserStorage;
use agenda_auth::types::User;

#[derive(Default)]
struct Inner {
    by_id: HashMap<Uuid, User>,
    by_name: HashMap<String, Uuid>,
}

/// User table with a username uniqueness index.
#[derive(Default)]
pub struct InMemoryUserStorage {
    inner: RwLock<Inner>,
}

impl InMemoryUserStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    /// Returns `true` if no accounts exist.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_id.is_empty()
    }
}

#[async_trait]
impl UserStorage for InMemoryUserStorage {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut inner = self.inner.write().await;

        if inner.by_name.contains_key(&user.username) {
            return Err(AuthError::invalid_request("Username is already taken"));
        }

        inner.by_name.insert(user.username.clone(), user.id);
        inner.by_id.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_name
            .get(username)
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_find() {
        let store = InMemoryUserStorage::new();
        let user = User::new("alice", "$argon2id$hash");
        store.create(&user).await.unwrap();

        let by_name = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = InMemoryUserStorage::new();
        store.create(&User::new("alice", "h1")).await.unwrap();

        let err = store.create(&User::new("alice", "h2")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_lookups_are_none() {
        let store = InMemoryUserStorage::new();
        assert!(store.find_by_username("ghost").await.unwrap().is_none());
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
