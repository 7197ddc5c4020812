//! Caller's active house.

use axum::{extract::State, Json};
use domain::models::house::{ActiveHouseResponse, SwitchHouseRequest};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, UserAuth};

/// GET /api/v1/me/house
///
/// `house_id` is null when the account belongs to no house.
pub async fn get_active_house(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<ActiveHouseResponse>, ApiError> {
    let house_id = state
        .tenant_resolver()
        .active_tenant(user_auth.user_id)
        .await?;
    Ok(Json(ActiveHouseResponse { house_id }))
}

/// PUT /api/v1/me/house
pub async fn switch_house(
    State(state): State<AppState>,
    user_auth: UserAuth,
    ApiJson(request): ApiJson<SwitchHouseRequest>,
) -> Result<Json<ActiveHouseResponse>, ApiError> {
    let ctx = state
        .tenant_resolver()
        .switch(user_auth.user_id, request.house_id)
        .await?;

    Ok(Json(ActiveHouseResponse {
        house_id: Some(ctx.tenant_id),
    }))
}
