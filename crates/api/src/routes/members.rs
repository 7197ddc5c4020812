//! Member approval queue.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::member::{
    ListMembersQuery, ListMembersResponse, Member, RejectMemberRequest, SetMemberActiveRequest,
};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminTenant, ApiJson};

/// GET /api/v1/members?status=pending|approved|rejected
pub async fn list_members(
    State(state): State<AppState>,
    AdminTenant(ctx): AdminTenant,
    Query(query): Query<ListMembersQuery>,
) -> Result<Json<ListMembersResponse>, ApiError> {
    let members = state.member_service().list(&ctx, query.status).await?;
    Ok(Json(ListMembersResponse { members }))
}

/// POST /api/v1/members/:member_id/approve
pub async fn approve_member(
    State(state): State<AppState>,
    AdminTenant(ctx): AdminTenant,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Member>, ApiError> {
    let member = state.member_service().approve(&ctx, member_id).await?;
    Ok(Json(member))
}

/// POST /api/v1/members/:member_id/reject
///
/// The body is optional; rejected members are kept, not deleted.
pub async fn reject_member(
    State(state): State<AppState>,
    AdminTenant(ctx): AdminTenant,
    Path(member_id): Path<Uuid>,
    request: Option<ApiJson<RejectMemberRequest>>,
) -> Result<Json<Member>, ApiError> {
    let request = request.map(|ApiJson(r)| r).unwrap_or_default();
    request.validate()?;
    let member = state
        .member_service()
        .reject(&ctx, member_id, request.reason)
        .await?;
    Ok(Json(member))
}

/// PUT /api/v1/members/:member_id/active
pub async fn set_member_active(
    State(state): State<AppState>,
    AdminTenant(ctx): AdminTenant,
    Path(member_id): Path<Uuid>,
    ApiJson(request): ApiJson<SetMemberActiveRequest>,
) -> Result<Json<Member>, ApiError> {
    let member = state
        .member_service()
        .set_active(&ctx, member_id, request.active)
        .await?;
    Ok(Json(member))
}
