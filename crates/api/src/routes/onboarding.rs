//! Public onboarding routes used by invitees.
//!
//! Neither route needs an account: the invite token is the credential.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use domain::models::invite::InviteRole;
use domain::models::registration::{AcceptInviteRequest, AcceptInviteResponse};
use domain::models::{ConsentKind, OnboardingSettings};
use domain::services::{InviteError, OnboardingSession};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ApiJson;

/// What the wizard needs to render for a usable invite.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PublicInviteResponse {
    pub id: Uuid,
    pub token: String,
    pub tenant_id: Uuid,
    pub role: InviteRole,
    pub expires_at: Option<DateTime<Utc>>,
    pub house_name: Option<String>,
    pub settings: OnboardingSettings,
    pub required_consents: Vec<ConsentKind>,
}

/// Looks up a usable invite and the settings of its house.
///
/// Store failures abort; invite-state problems are returned for the session
/// to turn into its dead end.
async fn open_session(state: &AppState, token: &str) -> Result<OnboardingSession, ApiError> {
    let lookup = match state.invite_service().lookup(token, Utc::now()).await {
        Ok(invite) => {
            let settings = state.settings_service().current(invite.tenant_id).await?;
            Ok((invite, settings))
        }
        Err(InviteError::Store(e)) => return Err(e.into()),
        Err(e) => Err(e),
    };
    Ok(OnboardingSession::open(lookup))
}

/// Fetch an invite for the onboarding wizard.
///
/// GET /api/v1/invites/:token
///
/// Used and expired invites are both reported as 410 Gone.
pub async fn get_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<PublicInviteResponse>, ApiError> {
    let invite = match state.invite_service().lookup(&token, Utc::now()).await {
        Ok(invite) => invite,
        Err(InviteError::AlreadyUsed) => {
            return Err(ApiError::Gone(InviteError::AlreadyUsed.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let settings = state.settings_service().current(invite.tenant_id).await?;
    let house_name = state
        .stores
        .houses
        .find_by_id(invite.tenant_id)
        .await?
        .map(|house| house.name);

    Ok(Json(PublicInviteResponse {
        id: invite.id,
        token: invite.token,
        tenant_id: invite.tenant_id,
        role: invite.role,
        expires_at: invite.expires_at,
        house_name,
        required_consents: settings.required_consents(),
        settings,
    }))
}

/// Accept an invite: register (or sign in) and join the house.
///
/// POST /api/v1/invites/:token/accept
///
/// Drives the onboarding session through every step with the submitted
/// form, so the same guards apply as in the interactive wizard.
pub async fn accept_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ApiJson(request): ApiJson<AcceptInviteRequest>,
) -> Result<Json<AcceptInviteResponse>, ApiError> {
    let mut session = open_session(&state, &token).await?;
    session.start()?;

    request.validate()?;

    session.set_profile(request.profile())?;
    session.continue_to_consents()?;
    session.set_consents(request.consents())?;

    let handler = state.provisioning_handler();
    let member = session.submit(&handler, &request.credentials()).await?;

    Ok(Json(AcceptInviteResponse {
        ok: true,
        member_id: member.id,
        tenant_id: member.tenant_id,
        approval_status: member.approval_status,
    }))
}
