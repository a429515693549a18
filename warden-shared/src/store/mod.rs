/// Credential store abstraction
///
/// The auth core only needs to look users up by username; registration also
/// needs an atomic create that enforces username uniqueness. Both are behind
/// the [`CredentialStore`] trait so the core can be driven by Postgres in
/// production and by an in-memory map in tests.
///
/// # Implementations
///
/// - [`postgres::PgCredentialStore`]: sqlx over the `users` table
/// - [`memory::MemoryCredentialStore`]: process-local `HashMap`
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden_shared::store::{memory::MemoryCredentialStore, CredentialStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
///
/// store.create("alice", "$argon2id$...").await?;
/// assert!(store.find_by_username("alice").await?.is_some());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;

use crate::models::user::User;

pub mod memory;
pub mod postgres;

/// Error type for credential store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A user with this username already exists
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Lookup and creation of user credentials
///
/// Uniqueness and persistence are the implementation's responsibility.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Finds a user by exact username
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Creates a user
    ///
    /// Fails with `StoreError::DuplicateUsername` if the username exists.
    async fn create(&self, username: &str, password_hash: &str) -> StoreResult<User>;

    /// Checks that the backing store is reachable
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
