//! Integration tests for the member approval queue.
//!
//! Run with: cargo test --test members_integration

mod common;

use axum::http::{Method, StatusCode};
use common::{
    accept_body, create_house_admin, get_request_with_auth, issue_invite, json_request,
    json_request_with_auth, unique_test_email, AuthenticatedUser, TestApp,
};
use serde_json::{json, Value};
use uuid::Uuid;

// ============================================================================
// Helper Functions
// ============================================================================

/// Accepts a fresh invite and returns the new member's id and email.
async fn join(app: &TestApp, admin: &AuthenticatedUser) -> (String, String) {
    let invite = issue_invite(app, admin, json!({ "role": "medium" })).await;
    let email = unique_test_email();
    let (status, json) = app
        .send(json_request(
            Method::POST,
            &format!("/api/v1/invites/{}/accept", invite["token"].as_str().unwrap()),
            accept_body(&email),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "accept failed: {}", json);
    (json["member_id"].as_str().unwrap().to_string(), email)
}

async fn post(app: &TestApp, uri: &str, body: Value, token: &str) -> (StatusCode, Value) {
    app.send(json_request_with_auth(Method::POST, uri, body, token))
        .await
}

async fn login(app: &TestApp, email: &str) -> String {
    let (status, json) = app
        .send(json_request(
            Method::POST,
            "/api/v1/auth/login",
            json!({ "email": email, "password": "axe-1234" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    json["tokens"]["access_token"].as_str().unwrap().to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_pending_members_listed_and_approved() {
    let app = TestApp::requiring_approval();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let (member_id, _) = join(&app, &admin).await;

    let (status, json) = app
        .send(get_request_with_auth(
            "/api/v1/members?status=pending",
            &admin.access_token,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let pending = json["members"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], member_id);
    assert_eq!(pending[0]["active"], false);

    let uri = format!("/api/v1/members/{}/approve", member_id);
    let (status, json) = post(&app, &uri, json!({}), &admin.access_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approval_status"], "approved");
    assert_eq!(json["active"], true);
    assert_eq!(json["reviewed_by"], admin.user_id);

    let (status, json) = post(&app, &uri, json!({}), &admin.access_token).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["message"].as_str().unwrap().contains("approved"));

    let (_, json) = app
        .send(get_request_with_auth(
            "/api/v1/members?status=pending",
            &admin.access_token,
        ))
        .await;
    assert!(json["members"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reject_with_reason_keeps_record() {
    let app = TestApp::requiring_approval();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let (member_id, email) = join(&app, &admin).await;

    let (status, json) = post(
        &app,
        &format!("/api/v1/members/{}/reject", member_id),
        json!({ "reason": "  Não frequenta a casa  " }),
        &admin.access_token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approval_status"], "rejected");
    assert_eq!(json["rejection_reason"], "Não frequenta a casa");

    let (_, json) = app
        .send(get_request_with_auth(
            "/api/v1/members?status=rejected",
            &admin.access_token,
        ))
        .await;
    assert_eq!(json["members"].as_array().unwrap().len(), 1);

    // A rejected membership no longer resolves to the house.
    let token = login(&app, &email).await;
    let (_, me) = app.send(get_request_with_auth("/api/v1/me/house", &token)).await;
    assert!(me["house_id"].is_null());
}

#[tokio::test]
async fn test_reject_without_body() {
    let app = TestApp::requiring_approval();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let (member_id, _) = join(&app, &admin).await;

    let (status, json) = app
        .send(
            axum::http::Request::builder()
                .method(Method::POST)
                .uri(format!("/api/v1/members/{}/reject", member_id))
                .header("Authorization", format!("Bearer {}", admin.access_token))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approval_status"], "rejected");
    assert!(json.get("rejection_reason").is_none());
}

#[tokio::test]
async fn test_review_unknown_member_not_found() {
    let app = TestApp::requiring_approval();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;

    let (status, _) = post(
        &app,
        &format!("/api/v1/members/{}/approve", Uuid::new_v4()),
        json!({}),
        &admin.access_token,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_member_of_other_house_not_found() {
    let app = TestApp::requiring_approval();
    let (admin_a, _) = create_house_admin(&app, "Casa A").await;
    let (admin_b, _) = create_house_admin(&app, "Casa B").await;
    let (member_id, _) = join(&app, &admin_a).await;

    let (status, _) = post(
        &app,
        &format!("/api/v1/members/{}/approve", member_id),
        json!({}),
        &admin_b.access_token,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_member_active() {
    let app = TestApp::new();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let (member_id, _) = join(&app, &admin).await;
    let uri = format!("/api/v1/members/{}/active", member_id);

    let (status, json) = app
        .send(json_request_with_auth(
            Method::PUT,
            &uri,
            json!({ "active": false }),
            &admin.access_token,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["active"], false);

    let (status, json) = app
        .send(json_request_with_auth(
            Method::PUT,
            &uri,
            json!({ "active": true }),
            &admin.access_token,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["active"], true);
}

#[tokio::test]
async fn test_admin_cannot_deactivate_self() {
    let app = TestApp::new();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;

    let (_, json) = app
        .send(get_request_with_auth("/api/v1/members", &admin.access_token))
        .await;
    let own = json["members"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["user_id"] == admin.user_id.as_str())
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, json) = app
        .send(json_request_with_auth(
            Method::PUT,
            &format!("/api/v1/members/{}/active", own),
            json!({ "active": false }),
            &admin.access_token,
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("deactivate"));
}

#[tokio::test]
async fn test_non_admin_cannot_review() {
    let app = TestApp::new();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let (_, email) = join(&app, &admin).await;
    let token = login(&app, &email).await;

    let (status, _) = app
        .send(get_request_with_auth("/api/v1/members", &token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_pending_member_cannot_use_admin_routes() {
    let app = TestApp::requiring_approval();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let (_, email) = join(&app, &admin).await;
    let token = login(&app, &email).await;

    let (status, _) = app
        .send(get_request_with_auth("/api/v1/onboarding-settings", &token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
