//! Credential store: registration, listing, and authentication.
//!
//! Storage sits behind the [`UserStore`] trait so handlers can run
//! against Postgres in production and the in-memory backend in tests.

pub mod handlers;
pub mod password;
mod postgres_store;
mod store;

pub use postgres_store::PostgresUserStore;
pub use store::{MemoryUserStore, StoreError, UserStore};

use serde::{Deserialize, Serialize};

/// A stored credential record. The password hash never leaves the process.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub company_name: String,
    pub email: String,
}

impl User {
    /// External representation. Deliberately omits the password hash.
    pub fn view(&self) -> UserView {
        UserView {
            username: self.username.clone(),
            company_name: self.company_name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub username: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub password: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub password: String,
}
