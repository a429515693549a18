/// Authentication core
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`token`]: HS256 bearer token issuance and verification
/// - [`authenticator`]: username/password login against a credential store
/// - [`resolver`]: bearer token to user resolution for protected requests
/// - [`middleware`]: Axum middleware wiring the resolver into a router
///
/// # Flow
///
/// ```text
/// login:      Authenticator::authenticate ──> TokenCodec::issue
/// protected:  bearer header ──> IdentityResolver::resolve ──> AuthContext
/// ```
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use chrono::Duration;
/// use warden_shared::auth::{
///     authenticator::Authenticator,
///     password::{HashingConfig, PasswordHasher},
///     resolver::IdentityResolver,
///     token::TokenCodec,
/// };
/// use warden_shared::store::{memory::MemoryCredentialStore, CredentialStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
/// let hasher = PasswordHasher::new(HashingConfig::default())?;
/// let codec = TokenCodec::new("secret-key-at-least-32-bytes-long!!");
///
/// store.create("alice", &hasher.hash("S3curePass!")?).await?;
///
/// let user = Authenticator::new(store.clone(), hasher)
///     .authenticate("alice", "S3curePass!")
///     .await?;
/// let token = codec.issue(&user.username, Duration::minutes(30))?;
///
/// let me = IdentityResolver::new(codec, store).resolve(&token).await?;
/// assert_eq!(me.id, user.id);
/// # Ok(())
/// # }
/// ```

pub mod authenticator;
pub mod middleware;
pub mod password;
pub mod resolver;
pub mod token;
