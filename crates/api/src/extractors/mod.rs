//! Custom Axum extractors.

pub mod json;
pub mod tenant;
pub mod user_auth;

pub use json::ApiJson;
pub use tenant::{ActiveTenant, AdminTenant};
pub use user_auth::UserAuth;
