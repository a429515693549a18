/// Postgres-backed credential store
///
/// Thin adapter from [`CredentialStore`] onto the [`User`] model. Username
/// uniqueness is enforced by the `users_username_key` constraint, so a racing
/// duplicate insert surfaces as `StoreError::DuplicateUsername` rather than
/// as a generic database error.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{CredentialStore, StoreError, StoreResult};
use crate::db::pool::health_check;
use crate::models::user::{CreateUser, User};

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// [`CredentialStore`] over a Postgres pool
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn create(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        User::create(
            &self.pool,
            CreateUser {
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            },
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateUsername(username.to_string())
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
