//! Repository for user accounts.

use async_trait::async_trait;
use domain::error::StoreError;
use domain::models::Account;
use domain::store::{AccountError, AccountStore};
use shared::password::{hash_password, verify_password};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserEntity;

/// Repository for account operations.
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Creates a new account repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, password_hash, display_name, created_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
    }
}

#[async_trait]
impl AccountStore for AccountRepository {
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Account, AccountError> {
        let password_hash =
            hash_password(password).map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (email, password_hash, display_name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, display_name, created_at
            "#,
        )
        .bind(email.trim().to_lowercase())
        .bind(&password_hash)
        .bind(display_name.trim())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(entity) => Ok(entity.into()),
            Err(err) => match StoreError::from(err) {
                StoreError::Conflict(_) => Err(AccountError::EmailTaken),
                other => Err(other.into()),
            },
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AccountError> {
        let user = self
            .find_by_email(email)
            .await
            .map_err(StoreError::from)?
            .ok_or(AccountError::InvalidCredentials)?;

        match verify_password(password, &user.password_hash) {
            Ok(true) => Ok(user.into()),
            Ok(false) => Err(AccountError::InvalidCredentials),
            Err(e) => Err(StoreError::Unavailable(e.to_string()).into()),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, password_hash, display_name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user.map(Into::into))
    }
}
