//! House routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::house::{CreateHouseRequest, House, HouseResponse};
use serde::Serialize;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, UserAuth};

#[derive(Debug, Serialize)]
pub struct ListHousesResponse {
    pub houses: Vec<HouseResponse>,
}

/// Create a house owned by the caller, who becomes its admin.
///
/// POST /api/v1/houses
pub async fn create_house(
    State(state): State<AppState>,
    user_auth: UserAuth,
    ApiJson(request): ApiJson<CreateHouseRequest>,
) -> Result<(StatusCode, Json<House>), ApiError> {
    request.validate()?;

    let owner = state
        .stores
        .accounts
        .find_by_id(user_auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    let house = state.house_service().create(&owner, &request.name).await?;
    Ok((StatusCode::CREATED, Json(house)))
}

/// Houses the caller belongs to, with the active one flagged.
///
/// GET /api/v1/houses
pub async fn list_houses(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<ListHousesResponse>, ApiError> {
    let active = state
        .tenant_resolver()
        .active_tenant(user_auth.user_id)
        .await?;
    let houses = state
        .house_service()
        .list(user_auth.user_id, active)
        .await?;
    Ok(Json(ListHousesResponse { houses }))
}
