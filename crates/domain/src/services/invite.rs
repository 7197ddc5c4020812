//! Invite issuance, validation and administration.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::metrics;
use crate::models::invite::{
    Invite, InviteRole, InviteStatus, InviteSummary, ListInvitesQuery, ListInvitesResponse,
    NewInvite, Pagination, MAX_EXPIRATION_DAYS, MIN_EXPIRATION_DAYS,
};
use crate::services::token::generate_invite_token;
use crate::store::InviteStore;

/// Attempts before giving up on token collisions.
const MAX_TOKEN_ATTEMPTS: usize = 3;

/// Outcome of checking an existing invite against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteValidity {
    Valid,
    AlreadyUsed,
    Expired,
}

/// Decides whether an invite can be used at `now`.
///
/// Consumption is checked before expiry so a used invite that has also
/// expired reports `AlreadyUsed`.
pub fn validate_invite(invite: &Invite, now: DateTime<Utc>) -> InviteValidity {
    match invite.status_at(now) {
        InviteStatus::Used => InviteValidity::AlreadyUsed,
        InviteStatus::Expired => InviteValidity::Expired,
        InviteStatus::Active => InviteValidity::Valid,
    }
}

/// Invite failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InviteError {
    #[error("Invite not found")]
    NotFound,

    #[error("Invite has already been used")]
    AlreadyUsed,

    #[error("Invite has expired")]
    Expired,

    #[error("Expiration must be between {min} and {max} days")]
    InvalidTtl { min: i64, max: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Full lookup check: existence first, then consumption, then expiry.
pub fn check_invite(invite: Option<Invite>, now: DateTime<Utc>) -> Result<Invite, InviteError> {
    let invite = invite.ok_or(InviteError::NotFound)?;
    match validate_invite(&invite, now) {
        InviteValidity::Valid => Ok(invite),
        InviteValidity::AlreadyUsed => Err(InviteError::AlreadyUsed),
        InviteValidity::Expired => Err(InviteError::Expired),
    }
}

/// Issues, looks up, lists and revokes invites.
#[derive(Clone)]
pub struct InviteService {
    invites: Arc<dyn InviteStore>,
    max_ttl_days: i64,
}

impl InviteService {
    pub fn new(invites: Arc<dyn InviteStore>, max_ttl_days: i64) -> Self {
        Self {
            invites,
            max_ttl_days: max_ttl_days.clamp(MIN_EXPIRATION_DAYS, MAX_EXPIRATION_DAYS),
        }
    }

    /// Issues an invite; `ttl_days = None` never expires.
    pub async fn issue(
        &self,
        tenant_id: Uuid,
        created_by: Uuid,
        role: InviteRole,
        ttl_days: Option<i64>,
    ) -> Result<Invite, InviteError> {
        if let Some(days) = ttl_days {
            if !(MIN_EXPIRATION_DAYS..=self.max_ttl_days).contains(&days) {
                return Err(InviteError::InvalidTtl {
                    min: MIN_EXPIRATION_DAYS,
                    max: self.max_ttl_days,
                });
            }
        }
        let expires_at = ttl_days.map(|days| Utc::now() + Duration::days(days));

        let mut attempt = 0;
        loop {
            attempt += 1;
            let new_invite = NewInvite {
                token: generate_invite_token(),
                tenant_id,
                role,
                created_by: Some(created_by),
                expires_at,
            };

            match self.invites.create(new_invite).await {
                Ok(invite) => {
                    info!(
                        invite_id = %invite.id,
                        tenant_id = %tenant_id,
                        role = %role,
                        expires_at = ?invite.expires_at,
                        "Invite issued"
                    );
                    metrics::record_invite_issued(role);
                    return Ok(invite);
                }
                Err(err) if err.is_conflict() && attempt < MAX_TOKEN_ATTEMPTS => {
                    warn!(attempt, "Invite token collision, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Finds a usable invite by token.
    pub async fn lookup(&self, token: &str, now: DateTime<Utc>) -> Result<Invite, InviteError> {
        let invite = self.invites.find_by_token(token).await?;
        let result = check_invite(invite, now);
        if let Err(ref err) = result {
            info!(error = %err, "Invite lookup rejected");
            metrics::record_invite_rejected(err);
        }
        result
    }

    /// Pages through a house's invites.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        query: &ListInvitesQuery,
        now: DateTime<Utc>,
    ) -> Result<ListInvitesResponse, InviteError> {
        let invites = self
            .invites
            .list_by_tenant(tenant_id, query.status, now, query.per_page(), query.offset())
            .await?;
        let total = self
            .invites
            .count_by_tenant(tenant_id, query.status, now)
            .await?;

        Ok(ListInvitesResponse {
            invites: invites
                .into_iter()
                .map(|invite| InviteSummary::from_invite(invite, now))
                .collect(),
            pagination: Pagination::new(query.page(), query.per_page(), total),
        })
    }

    /// Deletes an unused invite of the given house.
    pub async fn revoke(&self, tenant_id: Uuid, invite_id: Uuid) -> Result<(), InviteError> {
        let invite = self
            .invites
            .find_by_id(invite_id, tenant_id)
            .await?
            .ok_or(InviteError::NotFound)?;

        if invite.used_at.is_some() {
            return Err(InviteError::AlreadyUsed);
        }

        if !self.invites.delete_unused(invite_id, tenant_id).await? {
            // Consumed between the read and the delete.
            return Err(InviteError::AlreadyUsed);
        }

        info!(invite_id = %invite_id, tenant_id = %tenant_id, "Invite revoked");
        Ok(())
    }
}
