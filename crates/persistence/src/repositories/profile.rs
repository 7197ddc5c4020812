//! Repository for the per-account profile row.

use async_trait::async_trait;
use domain::error::StoreError;
use domain::store::ProfileStore;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for profile operations.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Creates a new profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn active_tenant(&self, user_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        let row: Option<(Option<Uuid>,)> =
            sqlx::query_as("SELECT active_tenant_id FROM profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.and_then(|(tenant_id,)| tenant_id))
    }

    async fn set_active_tenant(
        &self,
        user_id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, active_tenant_id, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET active_tenant_id = EXCLUDED.active_tenant_id, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
