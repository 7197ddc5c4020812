//! Repository for invite database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::StoreError;
use domain::models::invite::InviteStatusFilter;
use domain::models::{Invite, NewInvite};
use domain::store::InviteStore;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{InviteEntity, InviteRoleDb};

const INVITE_COLUMNS: &str = "id, token, tenant_id, role, created_by, created_at, expires_at, used_at";

/// SQL condition selecting invites by derived status; `$2` is the reference time.
fn status_condition(filter: InviteStatusFilter) -> &'static str {
    match filter {
        InviteStatusFilter::Active => {
            "used_at IS NULL AND (expires_at IS NULL OR expires_at >= $2)"
        }
        InviteStatusFilter::Used => "used_at IS NOT NULL AND $2::timestamptz IS NOT NULL",
        InviteStatusFilter::Expired => {
            "used_at IS NULL AND expires_at IS NOT NULL AND expires_at < $2"
        }
        InviteStatusFilter::All => "$2::timestamptz IS NOT NULL",
    }
}

/// Repository for invite operations.
#[derive(Clone)]
pub struct InviteRepository {
    pool: PgPool,
}

impl InviteRepository {
    /// Creates a new invite repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteStore for InviteRepository {
    async fn create(&self, invite: NewInvite) -> Result<Invite, StoreError> {
        let entity = sqlx::query_as::<_, InviteEntity>(&format!(
            r#"
            INSERT INTO invites (token, tenant_id, role, created_by, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {INVITE_COLUMNS}
            "#
        ))
        .bind(&invite.token)
        .bind(invite.tenant_id)
        .bind(InviteRoleDb::from(invite.role))
        .bind(invite.created_by)
        .bind(invite.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Invite>, StoreError> {
        let entity = sqlx::query_as::<_, InviteEntity>(&format!(
            "SELECT {INVITE_COLUMNS} FROM invites WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    async fn find_by_id(&self, id: Uuid, tenant_id: Uuid) -> Result<Option<Invite>, StoreError> {
        let entity = sqlx::query_as::<_, InviteEntity>(&format!(
            "SELECT {INVITE_COLUMNS} FROM invites WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        filter: InviteStatusFilter,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invite>, StoreError> {
        let query = format!(
            r#"
            SELECT {INVITE_COLUMNS}
            FROM invites
            WHERE tenant_id = $1 AND {}
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            status_condition(filter)
        );

        let entities = sqlx::query_as::<_, InviteEntity>(&query)
            .bind(tenant_id)
            .bind(now)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn count_by_tenant(
        &self,
        tenant_id: Uuid,
        filter: InviteStatusFilter,
        now: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let query = format!(
            "SELECT COUNT(*) FROM invites WHERE tenant_id = $1 AND {}",
            status_condition(filter)
        );

        let result: (i64,) = sqlx::query_as(&query)
            .bind(tenant_id)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }

    async fn claim(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE invites
            SET used_at = $2
            WHERE id = $1 AND used_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_unused(&self, id: Uuid, tenant_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM invites
            WHERE id = $1 AND tenant_id = $2 AND used_at IS NULL
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conditions_reference_now() {
        for filter in [
            InviteStatusFilter::Active,
            InviteStatusFilter::Used,
            InviteStatusFilter::Expired,
            InviteStatusFilter::All,
        ] {
            assert!(status_condition(filter).contains("$2"));
        }
        assert!(status_condition(InviteStatusFilter::Used).starts_with("used_at IS NOT NULL"));
    }
}
