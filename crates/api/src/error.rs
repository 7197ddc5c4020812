use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::error::StoreError;
use domain::services::{
    HouseError, InviteError, MemberError, OnboardingError, ProvisioningError, TenantError,
};
use domain::store::AccountError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The resource existed but can no longer be used.
    #[error("Gone: {0}")]
    Gone(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Gone(_) => StatusCode::GONE,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, message) = match self {
            ApiError::Unauthorized(msg) => ("unauthorized", msg),
            ApiError::Forbidden(msg) => ("forbidden", msg),
            ApiError::NotFound(msg) => ("not_found", msg),
            ApiError::Conflict(msg) => ("conflict", msg),
            ApiError::Gone(msg) => ("gone", msg),
            ApiError::Validation(msg) => ("validation_error", msg),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "An internal error occurred".to_string())
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    "service_unavailable",
                    "Service temporarily unavailable".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => {
                tracing::debug!(detail = %msg, "Store lookup missed");
                ApiError::NotFound("Resource not found".into())
            }
            StoreError::Conflict(_) => ApiError::Conflict("Resource already exists".into()),
            StoreError::Unavailable(msg) => ApiError::Internal(format!("Store error: {}", msg)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    let message = e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", field, message)
                })
            })
            .collect();
        messages.sort();

        ApiError::Validation(messages.join("; "))
    }
}

impl From<InviteError> for ApiError {
    fn from(err: InviteError) -> Self {
        match err {
            InviteError::NotFound => ApiError::NotFound(err.to_string()),
            InviteError::AlreadyUsed => ApiError::Conflict(err.to_string()),
            InviteError::Expired => ApiError::Gone(err.to_string()),
            InviteError::InvalidTtl { .. } => ApiError::Validation(err.to_string()),
            InviteError::Store(e) => e.into(),
        }
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(err: ProvisioningError) -> Self {
        match err {
            ProvisioningError::InvalidInvite(e) => e.into(),
            ProvisioningError::AlreadyUsed
            | ProvisioningError::InvalidCredentials
            | ProvisioningError::AlreadyMember => ApiError::Conflict(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<OnboardingError> for ApiError {
    fn from(err: OnboardingError) -> Self {
        match err {
            OnboardingError::InvalidField { .. } | OnboardingError::ConsentRequired(_) => {
                ApiError::Validation(err.to_string())
            }
            OnboardingError::InvalidTransition { .. } => ApiError::Internal(err.to_string()),
            OnboardingError::Invite(e) => e.into(),
            OnboardingError::Provisioning(e) => e.into(),
        }
    }
}

impl From<TenantError> for ApiError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::NoTenant => ApiError::Conflict(err.to_string()),
            TenantError::NotMember | TenantError::Forbidden => ApiError::Forbidden(err.to_string()),
            TenantError::Store(e) => e.into(),
        }
    }
}

impl From<HouseError> for ApiError {
    fn from(err: HouseError) -> Self {
        match err {
            HouseError::SlugExhausted => ApiError::Conflict(err.to_string()),
            HouseError::Store(e) => e.into(),
        }
    }
}

impl From<MemberError> for ApiError {
    fn from(err: MemberError) -> Self {
        match err {
            MemberError::NotFound => ApiError::NotFound(err.to_string()),
            MemberError::AlreadyReviewed(_) => ApiError::Conflict(err.to_string()),
            MemberError::SelfDeactivation => ApiError::Validation(err.to_string()),
            MemberError::Store(e) => e.into(),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".into())
            }
            AccountError::EmailTaken => ApiError::Conflict(err.to_string()),
            AccountError::Store(e) => e.into(),
        }
    }
}

impl From<shared::jwt::JwtError> for ApiError {
    fn from(err: shared::jwt::JwtError) -> Self {
        ApiError::Internal(format!("Token error: {}", err))
    }
}
