//! JSON body extractor with API error rejections.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Like [`axum::Json`], but malformed or incomplete bodies are rejected with
/// the usual 400 error body instead of axum's plain-text 415/422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, response::IntoResponse, routing::post, Router};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        name: String,
    }

    async fn handler(ApiJson(_): ApiJson<Payload>) -> impl IntoResponse {
        StatusCode::NO_CONTENT
    }

    async fn send(body: &'static str) -> StatusCode {
        let app = Router::new().route("/", post(handler));
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        assert_eq!(send("{}").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        assert_eq!(send("{not json").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        assert_eq!(send(r#"{"name":"Ana"}"#).await, StatusCode::NO_CONTENT);
    }
}
