//! PostgreSQL-backed credential store.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE users (
//!     username      VARCHAR(50)  PRIMARY KEY,
//!     password_hash VARCHAR(255) NOT NULL,
//!     company_name  VARCHAR(250) NOT NULL,
//!     email         VARCHAR(150) NOT NULL UNIQUE
//! );
//! ```
//!
//! The unique constraints are the authoritative duplicate guard; the
//! handler's pre-checks only exist for friendlier error messages.

use async_trait::async_trait;
use sqlx::PgPool;

use super::store::{StoreError, UserStore};
use super::User;

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Map a unique-constraint violation to the matching conflict error.
    fn map_insert_error(err: sqlx::Error, user: &User) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return match db_err.constraint() {
                    Some("users_email_key") => StoreError::DuplicateEmail(user.email.clone()),
                    _ => StoreError::DuplicateUsername(user.username.clone()),
                };
            }
        }
        StoreError::Database(err)
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, company_name, email)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.company_name)
        .bind(&user.email)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_insert_error(e, &user))?;

        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT username, password_hash, company_name, email
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT username, password_hash, company_name, email
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT username, password_hash, company_name, email
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
