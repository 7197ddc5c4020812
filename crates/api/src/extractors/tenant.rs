//! Active house extractors.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::services::TenantContext;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// The caller's active house, resolved from their profile pointer.
#[derive(Debug, Clone, Copy)]
pub struct ActiveTenant(pub TenantContext);

#[async_trait]
impl FromRequestParts<AppState> for ActiveTenant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = UserAuth::from_request_parts(parts, state).await?;
        let ctx = state.tenant_resolver().resolve(auth.user_id).await?;
        Ok(ActiveTenant(ctx))
    }
}

/// Active house where the caller is an approved, active admin.
#[derive(Debug, Clone, Copy)]
pub struct AdminTenant(pub TenantContext);

#[async_trait]
impl FromRequestParts<AppState> for AdminTenant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ActiveTenant(ctx) = ActiveTenant::from_request_parts(parts, state).await?;
        ctx.require_admin()?;
        Ok(AdminTenant(ctx))
    }
}
