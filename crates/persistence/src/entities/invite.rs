//! Invite entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Invite, InviteRole};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for invite_role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invite_role", rename_all = "lowercase")]
pub enum InviteRoleDb {
    Medium,
    Consulente,
}

impl From<InviteRoleDb> for InviteRole {
    fn from(db: InviteRoleDb) -> Self {
        match db {
            InviteRoleDb::Medium => Self::Medium,
            InviteRoleDb::Consulente => Self::Consulente,
        }
    }
}

impl From<InviteRole> for InviteRoleDb {
    fn from(role: InviteRole) -> Self {
        match role {
            InviteRole::Medium => Self::Medium,
            InviteRole::Consulente => Self::Consulente,
        }
    }
}

/// Database row mapping for the invites table.
#[derive(Debug, Clone, FromRow)]
pub struct InviteEntity {
    pub id: Uuid,
    pub token: String,
    pub tenant_id: Uuid,
    pub role: InviteRoleDb,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub used_at: Option<DateTime<Utc>>,
}

impl From<InviteEntity> for Invite {
    fn from(entity: InviteEntity) -> Self {
        Self {
            id: entity.id,
            token: entity.token,
            tenant_id: entity.tenant_id,
            role: entity.role.into(),
            created_by: entity.created_by,
            created_at: entity.created_at,
            expires_at: entity.expires_at,
            used_at: entity.used_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        assert_eq!(InviteRole::from(InviteRoleDb::Medium), InviteRole::Medium);
        assert_eq!(
            InviteRoleDb::from(InviteRole::Consulente),
            InviteRoleDb::Consulente
        );
    }

    #[test]
    fn test_entity_keeps_null_expiry() {
        let entity = InviteEntity {
            id: Uuid::new_v4(),
            token: "Abcd-Efgh-Jkmn-Pqrs".into(),
            tenant_id: Uuid::new_v4(),
            role: InviteRoleDb::Consulente,
            created_by: None,
            created_at: Utc::now(),
            expires_at: None,
            used_at: None,
        };
        let invite: Invite = entity.into();
        assert!(invite.expires_at.is_none());
        assert_eq!(invite.role, InviteRole::Consulente);
    }
}
