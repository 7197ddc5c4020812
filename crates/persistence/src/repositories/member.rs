//! Repository for house memberships.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::StoreError;
use domain::models::member::{MemberInsert, MemberReview};
use domain::models::{ApprovalStatus, Member, NewMember};
use domain::store::MemberStore;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ApprovalStatusDb, MemberEntity, MemberRoleDb};

const MEMBER_COLUMNS: &str = "id, tenant_id, user_id, invite_id, role, name, contact, email, \
    active, approval_status, consents, settings_version, reviewed_at, reviewed_by, \
    rejection_reason, created_at";

/// Repository for member operations.
#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Creates a new member repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Row that blocked an insert: same invite, or same house/account pair.
    async fn find_conflicting(&self, member: &NewMember) -> Result<Option<MemberEntity>, sqlx::Error> {
        sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            SELECT {MEMBER_COLUMNS}
            FROM members
            WHERE ($1::uuid IS NOT NULL AND invite_id = $1)
               OR (tenant_id = $2 AND user_id = $3)
            ORDER BY (invite_id = $1) DESC NULLS LAST
            LIMIT 1
            "#
        ))
        .bind(member.invite_id)
        .bind(member.tenant_id)
        .bind(member.user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[async_trait]
impl MemberStore for MemberRepository {
    async fn create_for_invite(&self, member: NewMember) -> Result<MemberInsert, StoreError> {
        let consents = serde_json::to_value(&member.consents)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let inserted = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            INSERT INTO members (
                tenant_id, user_id, invite_id, role, name, contact, email,
                active, approval_status, consents, settings_version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT DO NOTHING
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(member.tenant_id)
        .bind(member.user_id)
        .bind(member.invite_id)
        .bind(MemberRoleDb::from(member.role))
        .bind(&member.name)
        .bind(&member.contact)
        .bind(&member.email)
        .bind(member.active)
        .bind(ApprovalStatusDb::from(member.approval_status))
        .bind(consents)
        .bind(&member.settings_version)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(entity) = inserted {
            return Ok(MemberInsert::Created(entity.into()));
        }

        self.find_conflicting(&member)
            .await?
            .map(|entity| MemberInsert::Existing(entity.into()))
            .ok_or_else(|| StoreError::Conflict("member insert skipped without a conflicting row".into()))
    }

    async fn find_by_id(&self, id: Uuid, tenant_id: Uuid) -> Result<Option<Member>, StoreError> {
        let entity = sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    async fn find_by_tenant_and_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>, StoreError> {
        let entity = sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE tenant_id = $1 AND user_id = $2"
        ))
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Member>, StoreError> {
        let entities = sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<Member>, StoreError> {
        let entities = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            SELECT {MEMBER_COLUMNS}
            FROM members
            WHERE tenant_id = $1 AND ($2::approval_status IS NULL OR approval_status = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(tenant_id)
        .bind(status.map(ApprovalStatusDb::from))
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn set_active(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        active: bool,
    ) -> Result<Option<Member>, StoreError> {
        let entity = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            UPDATE members
            SET active = $3
            WHERE id = $1 AND tenant_id = $2
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(tenant_id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    async fn review(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        review: MemberReview,
        reviewer: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Member>, StoreError> {
        let (status, active, reason) = match review {
            MemberReview::Approve => (ApprovalStatusDb::Approved, true, None),
            MemberReview::Reject { reason } => (ApprovalStatusDb::Rejected, false, reason),
        };

        let entity = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            UPDATE members
            SET approval_status = $3, active = $4, rejection_reason = $5,
                reviewed_by = $6, reviewed_at = $7
            WHERE id = $1 AND tenant_id = $2 AND approval_status = 'pending'
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(tenant_id)
        .bind(status)
        .bind(active)
        .bind(reason)
        .bind(reviewer)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }
}
