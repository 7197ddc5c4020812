//! Acceptance/provisioning of a submitted registration.
//!
//! Runs as an ordered sequence of independent store calls:
//!
//! 1. re-validate the invite
//! 2. create or sign in the account
//! 3. point the account's profile at the house
//! 4. create the member (idempotent per invite)
//! 5. claim the invite (`used_at` set only if still unset)
//!
//! Nothing is rolled back. Steps 2-4 converge when repeated, so a retry after
//! a partial failure finishes the job; the invite is claimed last so such a
//! retry remains possible. An account created for a caller that then loses
//! the claim is left behind.

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::metrics;
use crate::models::invite::Invite;
use crate::models::member::{ApprovalStatus, ConsentRecord, Member, MemberInsert, MemberRole, NewMember};
use crate::models::registration::{Credentials, PendingRegistration};
use crate::models::Account;
use crate::services::invite::{check_invite, InviteError};
use crate::services::onboarding::Provisioner;
use crate::store::{AccountError, Stores};

/// Provisioning failures, one per step.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProvisioningError {
    #[error("Invalid invite: {0}")]
    InvalidInvite(InviteError),

    /// Another acceptance consumed the invite first.
    #[error("Invite has already been used")]
    AlreadyUsed,

    /// The email belongs to an account with a different password.
    #[error("Email already registered with different credentials")]
    InvalidCredentials,

    /// The account is already a member of this house through another invite.
    #[error("Account is already a member of this house")]
    AlreadyMember,

    #[error("Account creation failed: {0}")]
    AccountCreationFailed(String),

    #[error("Profile link failed: {0}")]
    ProfileLinkFailed(String),

    #[error("Member creation failed: {0}")]
    MemberCreationFailed(String),

    #[error("Invite consumption failed: {0}")]
    InviteConsumeFailed(String),
}

impl ProvisioningError {
    /// Whether a retry with the same input may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProvisioningError::AccountCreationFailed(_)
                | ProvisioningError::ProfileLinkFailed(_)
                | ProvisioningError::MemberCreationFailed(_)
                | ProvisioningError::InviteConsumeFailed(_)
        )
    }
}

/// Provisions members against the configured stores.
#[derive(Clone)]
pub struct ProvisioningHandler {
    stores: Stores,
    require_approval: bool,
}

impl ProvisioningHandler {
    pub fn new(stores: Stores, require_approval: bool) -> Self {
        Self {
            stores,
            require_approval,
        }
    }

    async fn revalidate(&self, token: &str) -> Result<Invite, ProvisioningError> {
        let found = self
            .stores
            .invites
            .find_by_token(token)
            .await
            .map_err(|e| ProvisioningError::InvalidInvite(InviteError::Store(e)))?;

        check_invite(found, Utc::now()).map_err(|err| match err {
            InviteError::AlreadyUsed => ProvisioningError::AlreadyUsed,
            other => ProvisioningError::InvalidInvite(other),
        })
    }

    async fn account(
        &self,
        registration: &PendingRegistration,
        credentials: &Credentials,
    ) -> Result<Account, ProvisioningError> {
        self.stores
            .accounts
            .create_or_authenticate(
                &credentials.email,
                &credentials.password,
                &registration.profile.name,
            )
            .await
            .map_err(|err| match err {
                AccountError::InvalidCredentials => ProvisioningError::InvalidCredentials,
                other => ProvisioningError::AccountCreationFailed(other.to_string()),
            })
    }

    fn new_member(&self, invite: &Invite, account: &Account, registration: &PendingRegistration) -> NewMember {
        let (active, approval_status) = if self.require_approval {
            (false, ApprovalStatus::Pending)
        } else {
            (true, ApprovalStatus::Approved)
        };

        NewMember {
            tenant_id: invite.tenant_id,
            user_id: account.id,
            invite_id: Some(invite.id),
            role: MemberRole::from(invite.role),
            name: registration.profile.name.clone(),
            contact: Some(registration.profile.contact.clone()).filter(|c| !c.is_empty()),
            email: account.email.clone(),
            active,
            approval_status,
            consents: ConsentRecord::from_invite(&registration.consents, invite.id),
            settings_version: Some(registration.settings_version.clone()),
        }
    }
}

#[async_trait]
impl Provisioner for ProvisioningHandler {
    async fn provision(
        &self,
        registration: &PendingRegistration,
        credentials: &Credentials,
    ) -> Result<Member, ProvisioningError> {
        let invite = self.revalidate(&registration.token).await?;

        let account = self.account(registration, credentials).await?;

        self.stores
            .profiles
            .set_active_tenant(account.id, Some(invite.tenant_id))
            .await
            .map_err(|e| ProvisioningError::ProfileLinkFailed(e.to_string()))?;

        let member = match self
            .stores
            .members
            .create_for_invite(self.new_member(&invite, &account, registration))
            .await
            .map_err(|e| ProvisioningError::MemberCreationFailed(e.to_string()))?
        {
            MemberInsert::Created(member) => member,
            MemberInsert::Existing(member) if member.invite_id == Some(invite.id) => {
                if member.user_id != account.id {
                    warn!(invite_id = %invite.id, "Invite already provisioned for another account");
                    return Err(ProvisioningError::AlreadyUsed);
                }
                info!(member_id = %member.id, "Resuming provisioning for existing member");
                member
            }
            MemberInsert::Existing(_) => return Err(ProvisioningError::AlreadyMember),
        };

        let claimed = self
            .stores
            .invites
            .claim(invite.id, Utc::now())
            .await
            .map_err(|e| ProvisioningError::InviteConsumeFailed(e.to_string()))?;
        if !claimed {
            warn!(invite_id = %invite.id, "Invite claim lost to a concurrent acceptance");
            metrics::record_invite_claim_lost();
            return Err(ProvisioningError::AlreadyUsed);
        }

        info!(
            invite_id = %invite.id,
            member_id = %member.id,
            tenant_id = %member.tenant_id,
            role = %member.role,
            approval_status = member.approval_status.as_str(),
            "Invite accepted"
        );
        metrics::record_invite_accepted(member.role);
        Ok(member)
    }
}
