//! Storage abstraction for credential records.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::error::AppError;

use super::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("Email already registered")]
    DuplicateEmail(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername(username) => {
                AppError::Conflict(format!("Username '{}' already exists", username))
            }
            StoreError::DuplicateEmail(_) => {
                AppError::Conflict("Email already registered".to_string())
            }
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

/// Create/lookup operations over credential records.
///
/// Implementations are the final duplicate-guard: a concurrent insert
/// of the same username or email must fail here even when the handler's
/// pre-checks raced.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;
}

/// In-memory backend, used by tests and local development.
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<String, User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        if self
            .users
            .iter()
            .any(|existing| existing.email == user.email)
        {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        match self.users.entry(user.username.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(StoreError::DuplicateUsername(user.username))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(())
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(username).map(|entry| entry.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.clone()))
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.iter().map(|entry| entry.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, email: &str) -> User {
        User {
            username: username.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            company_name: "Acme".to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_lookup() {
        let store = MemoryUserStore::new();
        store.insert(user("alice", "alice@acme.com")).await.unwrap();

        let found = store.find_by_username("alice").await.unwrap();
        assert_eq!(found.unwrap().email, "alice@acme.com");

        let by_email = store.find_by_email("alice@acme.com").await.unwrap();
        assert_eq!(by_email.unwrap().username, "alice");

        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let store = MemoryUserStore::new();
        store.insert(user("alice", "alice@acme.com")).await.unwrap();

        let result = store.insert(user("alice", "other@acme.com")).await;
        assert!(matches!(result, Err(StoreError::DuplicateUsername(_))));
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let store = MemoryUserStore::new();
        store.insert(user("alice", "alice@acme.com")).await.unwrap();

        let result = store.insert(user("bob", "alice@acme.com")).await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn list_returns_all_records() {
        let store = MemoryUserStore::new();
        store.insert(user("alice", "alice@acme.com")).await.unwrap();
        store.insert(user("bob", "bob@acme.com")).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
