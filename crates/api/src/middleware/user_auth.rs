//! Session token authentication.
//!
//! Validates the Bearer access token and stores the caller in request
//! extensions for the [`crate::extractors::UserAuth`] extractor.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::jwt::JwtConfig;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated account extracted from an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAuth {
    /// Account id from the token subject.
    pub user_id: Uuid,
    pub jti: String,
}

impl UserAuth {
    /// Validates an access token.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, ApiError> {
        let claims = jwt_config.validate_access_token(token).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;

        let user_id = shared::jwt::extract_user_id(&claims)
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        Ok(UserAuth {
            user_id,
            jti: claims.jti,
        })
    }

    /// Reads and validates the Bearer token from request headers.
    pub fn from_headers(jwt_config: &JwtConfig, headers: &HeaderMap) -> Result<Self, ApiError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
            })?;

        Self::validate(jwt_config, token)
    }
}

/// Middleware that rejects requests without a valid access token.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match UserAuth::from_headers(&state.jwt, req.headers()) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    fn jwt() -> JwtConfig {
        JwtConfig::from_secret("middleware-test-secret-123", 3600, 86400, 30).unwrap()
    }

    #[test]
    fn test_valid_bearer_token() {
        let config = jwt();
        let user_id = Uuid::new_v4();
        let issued = config.generate_access_token(user_id).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", issued.token)).unwrap(),
        );

        let auth = UserAuth::from_headers(&config, &headers).unwrap();
        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.jti, issued.jti);
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let err = UserAuth::from_headers(&jwt(), &HeaderMap::new()).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_refresh_token_rejected() {
        let config = jwt();
        let refresh = config.generate_refresh_token(Uuid::new_v4()).unwrap();
        assert!(UserAuth::validate(&config, &refresh.token).is_err());
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert!(UserAuth::from_headers(&jwt(), &headers).is_err());
    }
}
