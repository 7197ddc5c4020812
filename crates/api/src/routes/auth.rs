//! Account registration and sign-in routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::account::{
    AuthResponse, AuthTokens, LoginRequest, RefreshRequest, RegisterRequest,
};
use domain::models::Account;
use shared::jwt::extract_user_id;
use tracing::{debug, info};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ApiJson;

fn issue_tokens(state: &AppState, account: &Account) -> Result<AuthTokens, ApiError> {
    let access = state.jwt.generate_access_token(account.id)?;
    let refresh = state.jwt.generate_refresh_token(account.id)?;
    Ok(AuthTokens {
        access_token: access.token,
        refresh_token: refresh.token,
        token_type: "Bearer".to_string(),
        expires_in: access.expires_in,
    })
}

/// Register a new account with email and password.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let email = request.email.trim().to_lowercase();
    let account = state
        .stores
        .accounts
        .register(&email, &request.password, request.display_name.trim())
        .await?;

    info!(user_id = %account.id, "Account registered");

    let tokens = issue_tokens(&state, &account)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: account,
            tokens,
        }),
    ))
}

/// Sign in with email and password.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let email = request.email.trim().to_lowercase();
    let account = state
        .stores
        .accounts
        .authenticate(&email, &request.password)
        .await?;

    info!(user_id = %account.id, "Account signed in");

    let tokens = issue_tokens(&state, &account)?;
    Ok(Json(AuthResponse {
        user: account,
        tokens,
    }))
}

/// Exchange a refresh token for a new token pair.
///
/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid or expired refresh token".into());

    let claims = state
        .jwt
        .validate_refresh_token(&request.refresh_token)
        .map_err(|e| {
            debug!(error = %e, "Refresh token rejected");
            invalid()
        })?;
    let user_id = extract_user_id(&claims).map_err(|_| invalid())?;

    // Accounts removed since the token was issued cannot refresh.
    let account = state
        .stores
        .accounts
        .find_by_id(user_id)
        .await?
        .ok_or_else(invalid)?;

    info!(user_id = %account.id, "Tokens refreshed");

    let tokens = issue_tokens(&state, &account)?;
    Ok(Json(AuthResponse {
        user: account,
        tokens,
    }))
}
