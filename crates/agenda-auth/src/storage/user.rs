//! User account storage trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::user::User;

/// Storage trait for user accounts.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Stores a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidRequest` if the username is already taken,
    /// or a storage error if persistence fails.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Finds an account by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Finds an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>>;
}
