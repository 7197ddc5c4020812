//! Authenticated account extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::UserAuth as UserAuthData;

/// The signed-in account.
///
/// Uses what [`crate::middleware::require_user_auth`] stored when the route
/// is behind it, and validates the Bearer token itself otherwise.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub user_id: Uuid,
    pub jti: String,
}

impl From<UserAuthData> for UserAuth {
    fn from(data: UserAuthData) -> Self {
        Self {
            user_id: data.user_id,
            jti: data.jti,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<UserAuthData>() {
            return Ok(auth.clone().into());
        }

        UserAuthData::from_headers(&state.jwt, &parts.headers).map(Into::into)
    }
}
