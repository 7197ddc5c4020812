//! Member entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::member::ConsentRecord;
use domain::models::{ApprovalStatus, Member, MemberRole};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for member_role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
pub enum MemberRoleDb {
    Admin,
    Medium,
    Consulente,
}

impl From<MemberRoleDb> for MemberRole {
    fn from(db: MemberRoleDb) -> Self {
        match db {
            MemberRoleDb::Admin => Self::Admin,
            MemberRoleDb::Medium => Self::Medium,
            MemberRoleDb::Consulente => Self::Consulente,
        }
    }
}

impl From<MemberRole> for MemberRoleDb {
    fn from(role: MemberRole) -> Self {
        match role {
            MemberRole::Admin => Self::Admin,
            MemberRole::Medium => Self::Medium,
            MemberRole::Consulente => Self::Consulente,
        }
    }
}

/// Database enum for approval_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "approval_status", rename_all = "lowercase")]
pub enum ApprovalStatusDb {
    Pending,
    Approved,
    Rejected,
}

impl From<ApprovalStatusDb> for ApprovalStatus {
    fn from(db: ApprovalStatusDb) -> Self {
        match db {
            ApprovalStatusDb::Pending => Self::Pending,
            ApprovalStatusDb::Approved => Self::Approved,
            ApprovalStatusDb::Rejected => Self::Rejected,
        }
    }
}

impl From<ApprovalStatus> for ApprovalStatusDb {
    fn from(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Pending => Self::Pending,
            ApprovalStatus::Approved => Self::Approved,
            ApprovalStatus::Rejected => Self::Rejected,
        }
    }
}

/// Database row mapping for the members table.
#[derive(Debug, Clone, FromRow)]
pub struct MemberEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub invite_id: Option<Uuid>,
    pub role: MemberRoleDb,
    pub name: String,
    pub contact: Option<String>,
    pub email: String,
    pub active: bool,
    pub approval_status: ApprovalStatusDb,
    pub consents: JsonValue,
    pub settings_version: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MemberEntity> for Member {
    fn from(entity: MemberEntity) -> Self {
        let consents: ConsentRecord = serde_json::from_value(entity.consents).unwrap_or_default();
        Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            user_id: entity.user_id,
            invite_id: entity.invite_id,
            role: entity.role.into(),
            name: entity.name,
            contact: entity.contact,
            email: entity.email,
            active: entity.active,
            approval_status: entity.approval_status.into(),
            consents,
            settings_version: entity.settings_version,
            reviewed_at: entity.reviewed_at,
            reviewed_by: entity.reviewed_by,
            rejection_reason: entity.rejection_reason,
            created_at: entity.created_at,
        }
    }
}
