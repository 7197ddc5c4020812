//! House member models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::invite::InviteRole;
use super::registration::ConsentFlags;

/// Role of a member inside a house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Medium,
    Consulente,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "admin",
            MemberRole::Medium => "medium",
            MemberRole::Consulente => "consulente",
        }
    }

    /// Admins manage invites, settings and the approval queue.
    pub fn is_admin(&self) -> bool {
        matches!(self, MemberRole::Admin)
    }
}

impl From<InviteRole> for MemberRole {
    fn from(role: InviteRole) -> Self {
        match role {
            InviteRole::Medium => MemberRole::Medium,
            InviteRole::Consulente => MemberRole::Consulente,
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(MemberRole::Admin),
            "medium" => Ok(MemberRole::Medium),
            "consulente" => Ok(MemberRole::Consulente),
            other => Err(format!("Unknown member role: {}", other)),
        }
    }
}

/// Where a member sits in the approval queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(format!("Unknown approval status: {}", other)),
        }
    }
}

/// Consents recorded against a member, with their provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ConsentRecord {
    pub rules: bool,
    pub lgpd: bool,
    #[serde(default)]
    pub marketing: bool,
    #[serde(default)]
    pub contract: bool,
    /// `"invite"` for members created through onboarding, `"house"` for founders.
    pub created_from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite_id: Option<Uuid>,
}

impl ConsentRecord {
    pub fn from_invite(flags: &ConsentFlags, invite_id: Uuid) -> Self {
        Self {
            rules: flags.rules,
            lgpd: flags.data_usage,
            marketing: flags.marketing,
            contract: flags.contract,
            created_from: "invite".to_string(),
            invite_id: Some(invite_id),
        }
    }

    pub fn founder() -> Self {
        Self {
            rules: true,
            lgpd: true,
            marketing: false,
            contract: false,
            created_from: "house".to_string(),
            invite_id: None,
        }
    }
}

/// A user's membership in a house.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Member {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_id: Option<Uuid>,
    pub role: MemberRole,
    pub name: String,
    pub contact: Option<String>,
    pub email: String,
    pub active: bool,
    pub approval_status: ApprovalStatus,
    pub consents: ConsentRecord,
    /// Onboarding settings version the member agreed to.
    pub settings_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Whether this membership grants access to the house.
    pub fn grants_access(&self) -> bool {
        self.active && self.approval_status == ApprovalStatus::Approved
    }
}

/// Values needed to persist a new member.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub invite_id: Option<Uuid>,
    pub role: MemberRole,
    pub name: String,
    pub contact: Option<String>,
    pub email: String,
    pub active: bool,
    pub approval_status: ApprovalStatus,
    pub consents: ConsentRecord,
    pub settings_version: Option<String>,
}

/// Outcome of an idempotent member insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberInsert {
    Created(Member),
    /// A row with the same invite (or house/user pair) already existed.
    Existing(Member),
}

impl MemberInsert {
    pub fn into_member(self) -> Member {
        match self {
            MemberInsert::Created(m) | MemberInsert::Existing(m) => m,
        }
    }
}

/// Review decision applied to a pending member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberReview {
    Approve,
    Reject { reason: Option<String> },
}

/// Query parameters for listing members.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListMembersQuery {
    pub status: Option<ApprovalStatus>,
}

/// Request body for rejecting a pending member.
#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct RejectMemberRequest {
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

/// Request body for toggling a member's active flag.
#[derive(Debug, Clone, Deserialize)]
pub struct SetMemberActiveRequest {
    pub active: bool,
}

/// Response for listing members.
#[derive(Debug, Clone, Serialize)]
pub struct ListMembersResponse {
    pub members: Vec<Member>,
}
