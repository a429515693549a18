/// In-memory credential store
///
/// Keeps users in a `HashMap` behind a `tokio::sync::RwLock`. IDs are
/// assigned sequentially from 1. Nothing survives a restart, so this store is
/// meant for tests and local experiments.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{CredentialStore, StoreError, StoreResult};
use crate::models::user::User;

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<String, User>,
    next_id: i64,
}

/// Process-local [`CredentialStore`]
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl MemoryCredentialStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a user, returning it if it existed
    pub async fn remove(&self, username: &str) -> Option<User> {
        self.inner.write().await.users.remove(username)
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    /// Whether the store holds no users
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(username).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        // Check and insert under one write lock so concurrent creates can't both win.
        let mut inner = self.inner.write().await;

        if inner.users.contains_key(username) {
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }

        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        inner.users.insert(username.to_string(), user.clone());

        Ok(user)
    }
}
