//! Registration data collected by the onboarding wizard.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::member::ApprovalStatus;

/// Profile fields captured on the basic-info step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub name: String,
    pub contact: String,
    pub email: String,
}

impl ProfileDraft {
    /// Copy with surrounding whitespace removed and the email lowercased.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            contact: self.contact.trim().to_string(),
            email: self.email.trim().to_lowercase(),
        }
    }
}

/// Credentials the invitee signs up or signs in with.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Checkbox state on the consent-review step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentFlags {
    pub rules: bool,
    /// LGPD data-usage acknowledgement.
    pub data_usage: bool,
    pub marketing: bool,
    pub contract: bool,
}

/// Everything submitted by the wizard, handed to provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    pub invite_id: Uuid,
    pub token: String,
    pub profile: ProfileDraft,
    pub consents: ConsentFlags,
    /// Settings version the invitee was shown.
    pub settings_version: String,
}

/// Request body for `POST /invites/{token}/accept`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AcceptInviteRequest {
    #[validate(custom(function = "shared::validation::validate_person_name"))]
    pub name: String,

    #[serde(alias = "whatsapp")]
    #[validate(custom(function = "shared::validation::validate_contact"))]
    pub contact: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_password"))]
    pub password: String,

    #[serde(default)]
    pub accept_rules: bool,
    #[serde(default)]
    pub accept_lgpd: bool,
    #[serde(default)]
    pub accept_marketing: bool,
    #[serde(default)]
    pub accept_contract: bool,
}

impl AcceptInviteRequest {
    pub fn profile(&self) -> ProfileDraft {
        ProfileDraft {
            name: self.name.clone(),
            contact: self.contact.clone(),
            email: self.email.clone(),
        }
        .normalized()
    }

    pub fn consents(&self) -> ConsentFlags {
        ConsentFlags {
            rules: self.accept_rules,
            data_usage: self.accept_lgpd,
            marketing: self.accept_marketing,
            contract: self.accept_contract,
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.trim().to_lowercase(),
            password: self.password.clone(),
        }
    }
}

/// Response after a successful acceptance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AcceptInviteResponse {
    pub ok: bool,
    pub member_id: Uuid,
    pub tenant_id: Uuid,
    pub approval_status: ApprovalStatus,
}
