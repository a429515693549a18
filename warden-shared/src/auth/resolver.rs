/// Bearer token to identity resolution
///
/// [`IdentityResolver`] is the gate in front of every protected operation.
/// It runs two checks:
///
/// 1. The token's signature and expiry ([`TokenCodec::verify`])
/// 2. The subject still exists in the credential store
///
/// A valid signature only proves that we issued the token at some point;
/// the account may have been deleted since. The two failures are kept apart:
/// a bad token is `Unauthorized`, a good token for a missing account is
/// `UserNotFound`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use chrono::Duration;
/// use warden_shared::auth::{resolver::IdentityResolver, token::TokenCodec};
/// use warden_shared::store::{memory::MemoryCredentialStore, CredentialStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryCredentialStore::new());
/// store.create("alice", "$argon2id$...").await?;
///
/// let codec = TokenCodec::new("test-secret-key-at-least-32-bytes-long");
/// let token = codec.issue("alice", Duration::minutes(30))?;
///
/// let resolver = IdentityResolver::new(codec, store);
/// let user = resolver.resolve(&token).await?;
/// assert_eq!(user.username, "alice");
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use tracing::debug;

use super::token::{TokenCodec, TokenError};
use crate::models::user::User;
use crate::store::{CredentialStore, StoreError};

/// Error type for identity resolution
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Token failed signature, expiry or format checks
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] TokenError),

    /// Token was valid but its subject no longer exists
    #[error("User not found")]
    UserNotFound,

    /// Credential store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Turns bearer tokens into known users
#[derive(Clone)]
pub struct IdentityResolver {
    codec: TokenCodec,
    store: Arc<dyn CredentialStore>,
}

impl IdentityResolver {
    /// Creates a resolver over the given codec and store
    pub fn new(codec: TokenCodec, store: Arc<dyn CredentialStore>) -> Self {
        Self { codec, store }
    }

    /// Codec used for verification
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Resolves a bearer token to the user it was issued for
    ///
    /// # Errors
    ///
    /// - `ResolveError::Unauthorized` for any token failure
    /// - `ResolveError::UserNotFound` if the subject no longer exists
    /// - `ResolveError::Store` if the lookup fails
    pub async fn resolve(&self, token: &str) -> Result<User, ResolveError> {
        let subject = self.codec.verify(token).map_err(|e| {
            debug!(error = %e, "Bearer token rejected");
            ResolveError::Unauthorized(e)
        })?;

        match self.store.find_by_username(&subject).await? {
            Some(user) => Ok(user),
            None => {
                debug!(username = %subject, "Token subject no longer exists");
                Err(ResolveError::UserNotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryCredentialStore;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    async fn setup() -> (IdentityResolver, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        store.create("alice", "hash").await.unwrap();

        let resolver = IdentityResolver::new(TokenCodec::new(SECRET), store.clone());
        (resolver, store)
    }

    #[tokio::test]
    async fn test_resolve_valid_token() {
        let (resolver, _) = setup().await;
        let token = resolver.codec().issue("alice", Duration::minutes(30)).unwrap();

        let user = resolver.resolve(&token).await.expect("Should resolve");
        assert_eq!(user.username, "alice");
        assert_eq!(user.id, 1);
    }

    #[tokio::test]
    async fn test_forged_token_is_unauthorized() {
        let (resolver, _) = setup().await;
        let forged = TokenCodec::new("attacker-secret-key-at-least-32-bytes")
            .issue("alice", Duration::minutes(30))
            .unwrap();

        let result = resolver.resolve(&forged).await;
        assert!(matches!(
            result,
            Err(ResolveError::Unauthorized(TokenError::InvalidSignature))
        ));
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let (resolver, _) = setup().await;
        let token = resolver.codec().issue("alice", Duration::seconds(-60)).unwrap();

        let result = resolver.resolve(&token).await;
        assert!(matches!(
            result,
            Err(ResolveError::Unauthorized(TokenError::Expired))
        ));
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let (resolver, _) = setup().await;

        let result = resolver.resolve("garbage").await;
        assert!(matches!(
            result,
            Err(ResolveError::Unauthorized(TokenError::MalformedToken(_)))
        ));
    }

    #[tokio::test]
    async fn test_deleted_user_is_not_found() {
        let (resolver, store) = setup().await;
        let token = resolver.codec().issue("alice", Duration::minutes(30)).unwrap();

        store.remove("alice").await;

        let result = resolver.resolve(&token).await;
        assert!(matches!(result, Err(ResolveError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_never_registered_subject_is_not_found() {
        let (resolver, _) = setup().await;
        let token = resolver.codec().issue("ghost", Duration::minutes(30)).unwrap();

        let result = resolver.resolve(&token).await;
        assert!(matches!(result, Err(ResolveError::UserNotFound)));
    }
}
