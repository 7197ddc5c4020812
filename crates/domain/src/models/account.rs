//! Authenticated account models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An account held by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_password"))]
    pub password: String,

    #[validate(custom(function = "shared::validation::validate_person_name"))]
    pub display_name: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Token pair returned by the auth endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Response body for register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: Account,
    pub tokens: AuthTokens,
}
