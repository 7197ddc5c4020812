//! Member approval queue and activation.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::member::{ApprovalStatus, Member, MemberReview};
use crate::services::tenant::TenantContext;
use crate::store::MemberStore;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MemberError {
    #[error("Member not found")]
    NotFound,

    /// Review of a member that is not pending.
    #[error("Member is already {0}")]
    AlreadyReviewed(&'static str),

    #[error("Administrators cannot deactivate themselves")]
    SelfDeactivation,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct MemberService {
    members: Arc<dyn MemberStore>,
}

impl MemberService {
    pub fn new(members: Arc<dyn MemberStore>) -> Self {
        Self { members }
    }

    pub async fn list(
        &self,
        ctx: &TenantContext,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<Member>, MemberError> {
        Ok(self.members.list_by_tenant(ctx.tenant_id, status).await?)
    }

    async fn review(
        &self,
        ctx: &TenantContext,
        member_id: Uuid,
        review: MemberReview,
    ) -> Result<Member, MemberError> {
        let reviewed = self
            .members
            .review(member_id, ctx.tenant_id, review, ctx.user_id, Utc::now())
            .await?;

        match reviewed {
            Some(member) => {
                info!(
                    member_id = %member.id,
                    tenant_id = %ctx.tenant_id,
                    reviewer = %ctx.user_id,
                    status = member.approval_status.as_str(),
                    "Member reviewed"
                );
                Ok(member)
            }
            None => match self.members.find_by_id(member_id, ctx.tenant_id).await? {
                Some(member) => Err(MemberError::AlreadyReviewed(member.approval_status.as_str())),
                None => Err(MemberError::NotFound),
            },
        }
    }

    /// Approves a pending member, activating them.
    pub async fn approve(&self, ctx: &TenantContext, member_id: Uuid) -> Result<Member, MemberError> {
        self.review(ctx, member_id, MemberReview::Approve).await
    }

    /// Rejects a pending member. The row is kept for the record.
    pub async fn reject(
        &self,
        ctx: &TenantContext,
        member_id: Uuid,
        reason: Option<String>,
    ) -> Result<Member, MemberError> {
        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        self.review(ctx, member_id, MemberReview::Reject { reason })
            .await
    }

    pub async fn set_active(
        &self,
        ctx: &TenantContext,
        member_id: Uuid,
        active: bool,
    ) -> Result<Member, MemberError> {
        if !active && member_id == ctx.member_id {
            return Err(MemberError::SelfDeactivation);
        }

        let member = self
            .members
            .set_active(member_id, ctx.tenant_id, active)
            .await?
            .ok_or(MemberError::NotFound)?;

        info!(member_id = %member.id, active, "Member active flag changed");
        Ok(member)
    }
}
