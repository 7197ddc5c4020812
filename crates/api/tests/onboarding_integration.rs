//! Integration tests for the public onboarding flow: invite lookup and
//! acceptance.
//!
//! Run with: cargo test --test onboarding_integration

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{
    accept_body, create_authenticated_user, create_house_admin, get_request,
    get_request_with_auth, issue_invite, json_request, json_request_with_auth, unique_test_email,
    TestApp, TestUser,
};
use domain::store::FailPoint;
use serde_json::{json, Value};
use uuid::Uuid;

// ============================================================================
// Helper Functions
// ============================================================================

fn accept_uri(token: &str) -> String {
    format!("/api/v1/invites/{}/accept", token)
}

async fn accept(app: &TestApp, token: &str, body: Value) -> (StatusCode, Value) {
    app.send(json_request(Method::POST, &accept_uri(token), body))
        .await
}

async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let (status, json) = app
        .send(json_request(
            Method::POST,
            "/api/v1/auth/login",
            json!({ "email": email, "password": password }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", json);
    json["tokens"]["access_token"].as_str().unwrap().to_string()
}

fn uuid_of(value: &Value) -> Uuid {
    Uuid::parse_str(value.as_str().unwrap()).unwrap()
}

// ============================================================================
// Invite Lookup
// ============================================================================

#[tokio::test]
async fn test_issue_then_fetch_round_trip() {
    let app = TestApp::new();
    let (admin, house_id) = create_house_admin(&app, "Ilê Axé Oxóssi").await;
    let invite = issue_invite(&app, &admin, json!({ "role": "consulente" })).await;
    let token = invite["token"].as_str().unwrap();

    let (status, json) = app.send(get_request(&format!("/api/v1/invites/{}", token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["token"], token);
    assert_eq!(json["tenant_id"], house_id);
    assert_eq!(json["role"], "consulente");
    assert_eq!(json["house_name"], "Ilê Axé Oxóssi");
    assert_eq!(json["settings"]["lgpd_required"], true);
    assert_eq!(json["required_consents"], json!(["rules", "data_usage"]));
}

#[tokio::test]
async fn test_seven_day_invite_then_forced_expiry() {
    let app = TestApp::new();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let invite = issue_invite(&app, &admin, json!({ "role": "medium", "expires_in_days": 7 })).await;
    let token = invite["token"].as_str().unwrap();
    let uri = format!("/api/v1/invites/{}", token);

    let (status, _) = app.send(get_request(&uri)).await;
    assert_eq!(status, StatusCode::OK);

    assert!(app.store.set_invite_expiry(
        uuid_of(&invite["invite"]["id"]),
        Some(Utc::now() - Duration::days(1))
    ));

    let (status, json) = app.send(get_request(&uri)).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(json["error"], "gone");

    let (status, _) = accept(&app, token, accept_body(&unique_test_email())).await;
    assert_eq!(status, StatusCode::GONE);
}

#[tokio::test]
async fn test_never_expiring_invite_stays_valid() {
    let app = TestApp::new();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let invite = issue_invite(&app, &admin, json!({ "role": "medium", "expires_in_days": null })).await;
    assert!(invite["invite"]["expires_at"].is_null());

    let (status, json) = app
        .send(get_request(&format!(
            "/api/v1/invites/{}",
            invite["token"].as_str().unwrap()
        )))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["expires_at"].is_null());
}

#[tokio::test]
async fn test_unknown_token_not_found() {
    let app = TestApp::new();

    let (status, json) = app.send(get_request("/api/v1/invites/ABCD-EFGH-JKMN-PQRS")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");

    let (status, _) = accept(&app, "ABCD-EFGH-JKMN-PQRS", accept_body(&unique_test_email())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_failure_on_lookup_is_internal_error() {
    let app = TestApp::new();
    app.store.fail_on(FailPoint::FindInvite);

    let (status, json) = app.send(get_request("/api/v1/invites/ABCD-EFGH-JKMN-PQRS")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "An internal error occurred");
}

// ============================================================================
// Acceptance
// ============================================================================

#[tokio::test]
async fn test_accept_consumes_invite_once() {
    let app = TestApp::new();
    let (admin, house_id) = create_house_admin(&app, "Casa de Oxalá").await;
    let invite = issue_invite(&app, &admin, json!({ "role": "medium" })).await;
    let token = invite["token"].as_str().unwrap();
    let tenant = Uuid::parse_str(&house_id).unwrap();

    let (status, json) = accept(&app, token, accept_body(&unique_test_email())).await;
    assert_eq!(status, StatusCode::OK, "{}", json);
    assert_eq!(json["ok"], true);
    assert_eq!(json["tenant_id"], house_id);
    assert_eq!(json["approval_status"], "approved");
    assert_eq!(app.store.member_count(tenant), 2);

    // Used invites are gone for the wizard.
    let (status, _) = app.send(get_request(&format!("/api/v1/invites/{}", token))).await;
    assert_eq!(status, StatusCode::GONE);

    // A second acceptance neither succeeds nor adds a member.
    let (status, json) = accept(&app, token, accept_body(&unique_test_email())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");
    assert_eq!(app.store.member_count(tenant), 2);

    let (_, list) = app
        .send(get_request_with_auth("/api/v1/invites?status=used", &admin.access_token))
        .await;
    assert_eq!(list["invites"][0]["token"], token);
    assert!(list["invites"][0]["used_at"].is_string());
}

#[tokio::test]
async fn test_accepted_member_lands_in_house() {
    let app = TestApp::new();
    let (admin, house_id) = create_house_admin(&app, "Casa de Oxalá").await;
    let invite = issue_invite(&app, &admin, json!({ "role": "medium" })).await;
    let email = unique_test_email();

    let (status, _) = accept(&app, invite["token"].as_str().unwrap(), accept_body(&email)).await;
    assert_eq!(status, StatusCode::OK);

    let token = login(&app, &email, "axe-1234").await;
    let (status, json) = app
        .send(get_request_with_auth("/api/v1/me/house", &token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["house_id"], house_id);

    let (_, members) = app
        .send(get_request_with_auth("/api/v1/members", &admin.access_token))
        .await;
    let member = members["members"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["email"] == email.as_str())
        .unwrap()
        .clone();
    assert_eq!(member["role"], "medium");
    assert_eq!(member["name"], "Maria Souza");
    assert_eq!(member["contact"], "(21) 99999-8888");
    assert_eq!(member["active"], true);
    assert_eq!(member["consents"]["lgpd"], true);
    assert_eq!(member["consents"]["created_from"], "invite");
    assert_eq!(member["settings_version"], "v_default");
}

#[tokio::test]
async fn test_missing_data_usage_consent_blocks_submission() {
    let app = TestApp::new();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let invite = issue_invite(&app, &admin, json!({ "role": "medium" })).await;
    let token = invite["token"].as_str().unwrap();
    let accounts_before = app.store.account_count();

    let mut body = accept_body(&unique_test_email());
    body["accept_lgpd"] = json!(false);
    let (status, json) = accept(&app, token, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("lgpd"));
    // Nothing was provisioned and the invite is still usable.
    assert_eq!(app.store.account_count(), accounts_before);
    let (status, _) = app.send(get_request(&format!("/api/v1/invites/{}", token))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_rules_consent_blocks_submission() {
    let app = TestApp::new();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let invite = issue_invite(&app, &admin, json!({ "role": "medium" })).await;

    let mut body = accept_body(&unique_test_email());
    body["accept_rules"] = json!(false);
    let (status, json) = accept(&app, invite["token"].as_str().unwrap(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("rules"));
}

#[tokio::test]
async fn test_optional_consents_never_block() {
    let app = TestApp::new();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let invite = issue_invite(&app, &admin, json!({ "role": "consulente" })).await;

    let mut body = accept_body(&unique_test_email());
    body["accept_marketing"] = json!(false);
    body["accept_contract"] = json!(false);
    let (status, _) = accept(&app, invite["token"].as_str().unwrap(), body).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_fields_rejected() {
    let app = TestApp::new();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let invite = issue_invite(&app, &admin, json!({ "role": "medium" })).await;
    let token = invite["token"].as_str().unwrap();

    let cases = [
        ("name", json!("Jo")),
        ("whatsapp", json!("1234")),
        ("whatsapp", json!("call me maybe")),
        ("email", json!("not-an-email")),
        ("password", json!("123")),
    ];

    for (field, value) in cases {
        let mut body = accept_body(&unique_test_email());
        body[field] = value;
        let (status, json) = accept(&app, token, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "field = {}", field);
        assert_eq!(json["error"], "validation_error");
    }

    let (status, _) = accept(&app, token, json!({ "name": "Maria Souza" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // None of the rejected submissions consumed the invite.
    let (status, _) = app.send(get_request(&format!("/api/v1/invites/{}", token))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_existing_account_with_matching_password_joins() {
    let app = TestApp::new();
    let (admin, house_id) = create_house_admin(&app, "Casa de Oxalá").await;
    let user = TestUser::new();
    create_authenticated_user(&app, &user).await;
    let invite = issue_invite(&app, &admin, json!({ "role": "medium" })).await;

    let mut body = accept_body(&user.email);
    body["password"] = json!(user.password);
    let (status, json) = accept(&app, invite["token"].as_str().unwrap(), body).await;

    assert_eq!(status, StatusCode::OK, "{}", json);
    assert_eq!(json["tenant_id"], house_id);
}

#[tokio::test]
async fn test_existing_account_with_other_password_conflicts() {
    let app = TestApp::new();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let user = TestUser::new();
    create_authenticated_user(&app, &user).await;
    let invite = issue_invite(&app, &admin, json!({ "role": "medium" })).await;
    let token = invite["token"].as_str().unwrap();

    let (status, _) = accept(&app, token, accept_body(&user.email)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The invite was not consumed.
    let (status, _) = app.send(get_request(&format!("/api/v1/invites/{}", token))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_second_invite_for_same_member_conflicts() {
    let app = TestApp::new();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let first = issue_invite(&app, &admin, json!({ "role": "medium" })).await;
    let second = issue_invite(&app, &admin, json!({ "role": "consulente" })).await;
    let email = unique_test_email();

    let (status, _) = accept(&app, first["token"].as_str().unwrap(), accept_body(&email)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = accept(&app, second["token"].as_str().unwrap(), accept_body(&email)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["message"].as_str().unwrap().contains("already a member"));
}

#[tokio::test]
async fn test_retry_after_downstream_failure_converges() {
    let app = TestApp::new();
    let (admin, house_id) = create_house_admin(&app, "Casa de Oxalá").await;
    let invite = issue_invite(&app, &admin, json!({ "role": "medium" })).await;
    let token = invite["token"].as_str().unwrap();
    let tenant = Uuid::parse_str(&house_id).unwrap();
    let body = accept_body(&unique_test_email());

    app.store.fail_on(FailPoint::CreateMember);
    let (status, json) = accept(&app, token, body.clone()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "An internal error occurred");
    let accounts_after_failure = app.store.account_count();

    app.store.clear_failures();
    let (status, json) = accept(&app, token, body).await;
    assert_eq!(status, StatusCode::OK, "{}", json);

    // The retry reused the account created by the failed attempt.
    assert_eq!(app.store.account_count(), accounts_after_failure);
    assert_eq!(app.store.member_count(tenant), 2);
}

#[tokio::test]
async fn test_claim_failure_leaves_invite_retryable() {
    let app = TestApp::new();
    let (admin, house_id) = create_house_admin(&app, "Casa de Oxalá").await;
    let invite = issue_invite(&app, &admin, json!({ "role": "medium" })).await;
    let token = invite["token"].as_str().unwrap();
    let body = accept_body(&unique_test_email());

    app.store.fail_on(FailPoint::ClaimInvite);
    let (status, _) = accept(&app, token, body.clone()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    app.store.clear_failures();
    let (status, _) = accept(&app, token, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        app.store.member_count(Uuid::parse_str(&house_id).unwrap()),
        2
    );
}

#[tokio::test]
async fn test_pending_member_when_approval_required() {
    let app = TestApp::requiring_approval();
    let (admin, house_id) = create_house_admin(&app, "Casa de Oxalá").await;
    let invite = issue_invite(&app, &admin, json!({ "role": "medium" })).await;
    let email = unique_test_email();

    let (status, json) = accept(&app, invite["token"].as_str().unwrap(), accept_body(&email)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approval_status"], "pending");

    // The pending member still resolves to the house.
    let token = login(&app, &email, "axe-1234").await;
    let (_, me) = app.send(get_request_with_auth("/api/v1/me/house", &token)).await;
    assert_eq!(me["house_id"], house_id);
}

#[tokio::test]
async fn test_concurrent_acceptance_has_one_winner() {
    let app = TestApp::new();
    let (admin, house_id) = create_house_admin(&app, "Casa de Oxalá").await;
    let invite = issue_invite(&app, &admin, json!({ "role": "medium" })).await;
    let token = invite["token"].as_str().unwrap().to_string();

    let first = accept(&app, &token, accept_body(&unique_test_email()));
    let second = accept(&app, &token, accept_body(&unique_test_email()));
    let ((status_a, _), (status_b, _)) = tokio::join!(first, second);

    let mut statuses = [status_a, status_b];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);
    assert_eq!(
        app.store.member_count(Uuid::parse_str(&house_id).unwrap()),
        2
    );
}

#[tokio::test]
async fn test_accept_with_required_contract() {
    let app = TestApp::new();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;

    let (status, _) = app
        .send(json_request_with_auth(
            Method::PUT,
            "/api/v1/onboarding-settings",
            json!({
                "rules_text": "Respeite a gira.",
                "lgpd_text": "Seus dados ficam na casa.",
                "contract_enabled": true,
                "contract_required": true,
                "contract_text": "Eu, {{NOME_COMPLETO}}, entro na {{CASA_NOME}} em {{DATA}}."
            }),
            &admin.access_token,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let invite = issue_invite(&app, &admin, json!({ "role": "medium" })).await;
    let token = invite["token"].as_str().unwrap();

    let (_, public) = app.send(get_request(&format!("/api/v1/invites/{}", token))).await;
    assert_eq!(
        public["required_consents"],
        json!(["rules", "data_usage", "contract"])
    );
    let version = public["settings"]["version_id"].as_str().unwrap().to_string();

    let mut body = accept_body(&unique_test_email());
    body["accept_contract"] = json!(false);
    let (status, json) = accept(&app, token, body.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("contract"));

    body["accept_contract"] = json!(true);
    let (status, _) = accept(&app, token, body.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (_, members) = app
        .send(get_request_with_auth("/api/v1/members", &admin.access_token))
        .await;
    let member = members["members"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["email"] == body["email"])
        .unwrap()
        .clone();
    assert_eq!(member["consents"]["contract"], true);
    assert_eq!(member["settings_version"], version.as_str());
}

#[tokio::test]
async fn test_consents_not_offered_are_not_recorded() {
    let app = TestApp::new();
    let (admin, _) = create_house_admin(&app, "Casa de Oxalá").await;
    let (status, _) = app
        .send(json_request_with_auth(
            Method::PUT,
            "/api/v1/onboarding-settings",
            json!({
                "rules_text": "Respeite a gira.",
                "lgpd_text": "Seus dados ficam na casa.",
                "marketing_opt_in_enabled": false,
                "contract_enabled": false
            }),
            &admin.access_token,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let invite = issue_invite(&app, &admin, json!({ "role": "medium" })).await;
    let email = unique_test_email();
    let mut body = accept_body(&email);
    body["accept_marketing"] = json!(true);
    body["accept_contract"] = json!(true);
    let (status, _) = accept(&app, invite["token"].as_str().unwrap(), body).await;
    assert_eq!(status, StatusCode::OK);

    let (_, members) = app
        .send(get_request_with_auth("/api/v1/members", &admin.access_token))
        .await;
    let member = members["members"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["email"] == email.as_str())
        .unwrap()
        .clone();
    assert_eq!(member["consents"]["marketing"], false);
    assert_eq!(member["consents"]["contract"], false);
    assert_eq!(member["consents"]["rules"], true);
    assert_eq!(member["consents"]["lgpd"], true);
}
