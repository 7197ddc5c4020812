//! Invite administration routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::invite::{
    CreateInviteRequest, CreateInviteResponse, InviteSummary, ListInvitesQuery,
    ListInvitesResponse,
};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminTenant, ApiJson, UserAuth};

/// Issue an invite.
///
/// POST /api/v1/invites
///
/// Targets `tenant_id` when given, otherwise the caller's active house.
/// The caller must be an admin there.
pub async fn create_invite(
    State(state): State<AppState>,
    user_auth: UserAuth,
    ApiJson(request): ApiJson<CreateInviteRequest>,
) -> Result<(StatusCode, Json<CreateInviteResponse>), ApiError> {
    let resolver = state.tenant_resolver();
    let ctx = match request.tenant_id {
        Some(tenant_id) => resolver.for_tenant(user_auth.user_id, tenant_id).await?,
        None => resolver.resolve(user_auth.user_id).await?,
    };
    ctx.require_admin()?;

    let ttl_days = request.ttl_days(state.config.onboarding.default_invite_ttl_days);
    let invite = state
        .invite_service()
        .issue(ctx.tenant_id, user_auth.user_id, request.role, ttl_days)
        .await?;

    let link = state.config.invite_link(&invite.token);
    info!(invite_id = %invite.id, user_id = %user_auth.user_id, "Invite link created");

    Ok((
        StatusCode::CREATED,
        Json(CreateInviteResponse {
            token: invite.token.clone(),
            link,
            invite: InviteSummary::from_invite(invite, Utc::now()),
        }),
    ))
}

/// List invites of the active house.
///
/// GET /api/v1/invites?status=active|used|expired|all&page=&per_page=
pub async fn list_invites(
    State(state): State<AppState>,
    AdminTenant(ctx): AdminTenant,
    Query(query): Query<ListInvitesQuery>,
) -> Result<Json<ListInvitesResponse>, ApiError> {
    let response = state
        .invite_service()
        .list(ctx.tenant_id, &query, Utc::now())
        .await?;
    Ok(Json(response))
}

/// Revoke an unused invite of the active house.
///
/// DELETE /api/v1/invites/:id
pub async fn revoke_invite(
    State(state): State<AppState>,
    AdminTenant(ctx): AdminTenant,
    Path(invite_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.invite_service().revoke(ctx.tenant_id, invite_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
