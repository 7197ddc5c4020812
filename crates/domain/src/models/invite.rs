//! House invitation domain models.
//!
//! An invite is a single-use, optionally time-limited token that lets its
//! bearer register into one house with one role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Upper bound on the configurable invite lifetime.
pub const MAX_EXPIRATION_DAYS: i64 = 365;

/// Minimum lifetime an invite can be issued with.
pub const MIN_EXPIRATION_DAYS: i64 = 1;

/// Role granted to the invitee on acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteRole {
    Medium,
    Consulente,
}

impl InviteRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteRole::Medium => "medium",
            InviteRole::Consulente => "consulente",
        }
    }
}

impl fmt::Display for InviteRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InviteRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "medium" => Ok(InviteRole::Medium),
            "consulente" => Ok(InviteRole::Consulente),
            other => Err(format!("Unknown invite role: {}", other)),
        }
    }
}

/// Derived invite status; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Active,
    Used,
    Expired,
}

/// A persisted invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invite {
    pub id: Uuid,
    pub token: String,
    pub tenant_id: Uuid,
    pub role: InviteRole,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// `None` means the invite never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// `None` means the invite has not been consumed.
    pub used_at: Option<DateTime<Utc>>,
}

impl Invite {
    /// Status at `now`. A consumed invite reports `Used` even past its expiry.
    pub fn status_at(&self, now: DateTime<Utc>) -> InviteStatus {
        if self.used_at.is_some() {
            InviteStatus::Used
        } else if self.expires_at.is_some_and(|expires_at| expires_at < now) {
            InviteStatus::Expired
        } else {
            InviteStatus::Active
        }
    }
}

/// Values needed to persist a new invite.
#[derive(Debug, Clone)]
pub struct NewInvite {
    pub token: String,
    pub tenant_id: Uuid,
    pub role: InviteRole,
    pub created_by: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request to issue an invite.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateInviteRequest {
    /// House to invite into; defaults to the caller's active house.
    pub tenant_id: Option<Uuid>,

    pub role: InviteRole,

    /// Days until expiry.
    ///
    /// Absent uses the configured default; an explicit `null` issues a
    /// never-expiring invite.
    #[serde(default, alias = "days", deserialize_with = "explicit_null")]
    pub expires_in_days: Option<Option<i64>>,
}

impl CreateInviteRequest {
    /// Resolves the requested lifetime against the configured default.
    pub fn ttl_days(&self, default_days: Option<i64>) -> Option<i64> {
        match self.expires_in_days {
            Some(explicit) => explicit,
            None => default_days,
        }
    }
}

/// Keeps an explicit JSON `null` distinct from an absent field.
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

/// Invite representation returned to administrators and invitees.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InviteSummary {
    pub id: Uuid,
    pub token: String,
    pub tenant_id: Uuid,
    pub role: InviteRole,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
}

impl InviteSummary {
    pub fn from_invite(invite: Invite, now: DateTime<Utc>) -> Self {
        let status = invite.status_at(now);
        Self {
            id: invite.id,
            token: invite.token,
            tenant_id: invite.tenant_id,
            role: invite.role,
            status,
            created_at: invite.created_at,
            expires_at: invite.expires_at,
            used_at: invite.used_at,
        }
    }
}

/// Response after issuing an invite.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateInviteResponse {
    pub token: String,
    pub link: String,
    pub invite: InviteSummary,
}

/// Status filter for invite listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatusFilter {
    Active,
    Used,
    Expired,
    #[default]
    All,
}

impl InviteStatusFilter {
    pub fn matches(&self, status: InviteStatus) -> bool {
        match self {
            InviteStatusFilter::All => true,
            InviteStatusFilter::Active => status == InviteStatus::Active,
            InviteStatusFilter::Used => status == InviteStatus::Used,
            InviteStatusFilter::Expired => status == InviteStatus::Expired,
        }
    }
}

/// Query parameters for listing invites.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ListInvitesQuery {
    #[serde(default)]
    pub status: InviteStatusFilter,

    /// Page number (default: 1).
    pub page: Option<i64>,

    /// Items per page (default: 50, max: 100).
    pub per_page: Option<i64>,
}

impl ListInvitesQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(50).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }
}

/// Page metadata for listings.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = (total + per_page - 1) / per_page;
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Response for listing invites.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListInvitesResponse {
    pub invites: Vec<InviteSummary>,
    pub pagination: Pagination,
}
