/// Username/password authentication
///
/// [`Authenticator`] checks a login attempt against the credential store.
/// An unknown username and a wrong password produce the same
/// `AuthError::InvalidCredentials`, so callers cannot use the login endpoint
/// to discover which usernames exist. The difference is still logged at
/// `debug` level for operators.
///
/// Password verification is CPU-heavy and runs on tokio's blocking pool.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden_shared::auth::authenticator::Authenticator;
/// use warden_shared::auth::password::{HashingConfig, PasswordHasher};
/// use warden_shared::store::{memory::MemoryCredentialStore, CredentialStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryCredentialStore::new());
/// let hasher = PasswordHasher::new(HashingConfig::default())?;
/// store.create("alice", &hasher.hash("S3curePass!")?).await?;
///
/// let authenticator = Authenticator::new(store, hasher);
/// let user = authenticator.authenticate("alice", "S3curePass!").await?;
/// assert_eq!(user.username, "alice");
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use tracing::debug;

use super::password::{PasswordError, PasswordHasher};
use crate::models::user::User;
use crate::store::{CredentialStore, StoreError};

/// Error type for login attempts
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password; deliberately undifferentiated
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The stored hash could not be checked
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Credential store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Blocking hash task panicked or was cancelled
    #[error("Password verification task failed: {0}")]
    Task(String),
}

/// Validates username/password pairs against a [`CredentialStore`]
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
}

impl Authenticator {
    /// Creates an authenticator over the given store and hasher
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Authenticates a login attempt
    ///
    /// # Returns
    ///
    /// The matching user on success
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidCredentials` if the user does not exist or the
    ///   password is wrong
    /// - `AuthError::Password` if the stored hash is malformed
    /// - `AuthError::Store` if the lookup fails
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.store.find_by_username(username).await? else {
            debug!(username, "Login rejected: unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Task(e.to_string()))??;

        if !valid {
            debug!(username, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        debug!(username, user_id = user.id, "Login accepted");
        Ok(user)
    }
}
