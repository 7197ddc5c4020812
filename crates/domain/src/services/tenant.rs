//! Active house resolution.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::member::{ApprovalStatus, Member, MemberRole};
use crate::store::{HouseStore, MemberStore, ProfileStore, Stores};

/// The house a request operates in, and the caller's standing there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub member_id: Uuid,
    pub role: MemberRole,
    pub approval_status: ApprovalStatus,
    pub active: bool,
}

impl TenantContext {
    fn from_member(member: &Member) -> Self {
        Self {
            tenant_id: member.tenant_id,
            user_id: member.user_id,
            member_id: member.id,
            role: member.role,
            approval_status: member.approval_status,
            active: member.active,
        }
    }

    /// Approved, active admin of the house.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin() && self.active && self.approval_status == ApprovalStatus::Approved
    }

    pub fn require_admin(&self) -> Result<(), TenantError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(TenantError::Forbidden)
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TenantError {
    /// The account belongs to no house.
    #[error("No house found for this account")]
    NoTenant,

    #[error("Not a member of this house")]
    NotMember,

    #[error("Administrator role required")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves and switches the caller's active house.
#[derive(Clone)]
pub struct TenantContextResolver {
    houses: Arc<dyn HouseStore>,
    members: Arc<dyn MemberStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl TenantContextResolver {
    pub fn new(stores: &Stores) -> Self {
        Self {
            houses: stores.houses.clone(),
            members: stores.members.clone(),
            profiles: stores.profiles.clone(),
        }
    }

    /// A membership counts while its house exists and it was not rejected.
    async fn usable_membership(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>, StoreError> {
        if self.houses.find_by_id(tenant_id).await?.is_none() {
            return Ok(None);
        }
        Ok(self
            .members
            .find_by_tenant_and_user(tenant_id, user_id)
            .await?
            .filter(|m| m.approval_status != ApprovalStatus::Rejected))
    }

    /// Returns the caller's active house context.
    ///
    /// Follows the stored pointer when it still leads to a usable membership.
    /// Otherwise the pointer is cleared and the earliest usable membership is
    /// chosen and stored as the new pointer.
    pub async fn resolve(&self, user_id: Uuid) -> Result<TenantContext, TenantError> {
        if let Some(tenant_id) = self.profiles.active_tenant(user_id).await? {
            if let Some(member) = self.usable_membership(tenant_id, user_id).await? {
                return Ok(TenantContext::from_member(&member));
            }
            debug!(user_id = %user_id, tenant_id = %tenant_id, "Clearing stale active house");
            self.profiles.set_active_tenant(user_id, None).await?;
        }

        for member in self.members.list_for_user(user_id).await? {
            if member.approval_status == ApprovalStatus::Rejected {
                continue;
            }
            if self.houses.find_by_id(member.tenant_id).await?.is_none() {
                continue;
            }
            self.profiles
                .set_active_tenant(user_id, Some(member.tenant_id))
                .await?;
            info!(user_id = %user_id, tenant_id = %member.tenant_id, "Active house selected");
            return Ok(TenantContext::from_member(&member));
        }

        Err(TenantError::NoTenant)
    }

    /// Active house id, or `None` when the account has no house.
    pub async fn active_tenant(&self, user_id: Uuid) -> Result<Option<Uuid>, TenantError> {
        match self.resolve(user_id).await {
            Ok(ctx) => Ok(Some(ctx.tenant_id)),
            Err(TenantError::NoTenant) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Context for an explicitly named house, without touching the pointer.
    pub async fn for_tenant(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<TenantContext, TenantError> {
        self.usable_membership(tenant_id, user_id)
            .await?
            .map(|m| TenantContext::from_member(&m))
            .ok_or(TenantError::NotMember)
    }

    /// Makes `tenant_id` the caller's active house.
    pub async fn switch(&self, user_id: Uuid, tenant_id: Uuid) -> Result<TenantContext, TenantError> {
        let ctx = self.for_tenant(user_id, tenant_id).await?;
        self.profiles.set_active_tenant(user_id, Some(tenant_id)).await?;
        info!(user_id = %user_id, tenant_id = %tenant_id, "Active house switched");
        Ok(ctx)
    }
}
