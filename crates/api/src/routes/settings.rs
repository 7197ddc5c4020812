//! Onboarding settings administration.

use axum::{extract::State, Json};
use domain::models::onboarding_settings::{SettingsResponse, UpdateSettingsRequest};
use domain::models::OnboardingSettings;
use domain::services::{settings_response, TenantContext};
use serde_json::Value;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminTenant, ApiJson};

async fn respond(
    state: &AppState,
    ctx: &TenantContext,
    settings: OnboardingSettings,
) -> Result<Json<SettingsResponse>, ApiError> {
    let house_name = state
        .stores
        .houses
        .find_by_id(ctx.tenant_id)
        .await?
        .map(|house| house.name)
        .unwrap_or_default();
    Ok(Json(settings_response(settings, &house_name)))
}

/// GET /api/v1/onboarding-settings
///
/// Defaults are returned until the house saves a version.
pub async fn get_settings(
    State(state): State<AppState>,
    AdminTenant(ctx): AdminTenant,
) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = state.settings_service().current(ctx.tenant_id).await?;
    respond(&state, &ctx, settings).await
}

/// PUT /api/v1/onboarding-settings
///
/// Every save mints a new version; members keep the version they agreed to.
pub async fn update_settings(
    State(state): State<AppState>,
    AdminTenant(ctx): AdminTenant,
    ApiJson(request): ApiJson<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    request.validate()?;
    let settings = state
        .settings_service()
        .save(ctx.tenant_id, ctx.user_id, request)
        .await?;
    respond(&state, &ctx, settings).await
}

/// POST /api/v1/onboarding-settings/import
///
/// Accepts a legacy settings document in any of its historical shapes.
pub async fn import_settings(
    State(state): State<AppState>,
    AdminTenant(ctx): AdminTenant,
    ApiJson(raw): ApiJson<Value>,
) -> Result<Json<SettingsResponse>, ApiError> {
    if !raw.is_object() {
        return Err(ApiError::Validation(
            "Legacy settings must be a JSON object".to_string(),
        ));
    }
    let settings = state
        .settings_service()
        .import_legacy(ctx.tenant_id, ctx.user_id, &raw)
        .await?;
    respond(&state, &ctx, settings).await
}
