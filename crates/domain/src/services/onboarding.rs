//! Onboarding wizard state machine.
//!
//! ```text
//! Welcome -> BasicInfo -> ConsentReview -> Submitted
//!    ^           |  ^            |
//!    +-- back ---+  +--- back ---+
//! ```
//!
//! A session opened with an unusable invite sits in `DeadEnd` and never
//! advances. Submission hands the collected data to a [`Provisioner`]; on
//! failure the session stays on `ConsentReview` with the error recorded.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::invite::Invite;
use crate::models::member::Member;
use crate::models::onboarding_settings::{ConsentKind, OnboardingSettings};
use crate::models::registration::{ConsentFlags, Credentials, PendingRegistration, ProfileDraft};
use crate::services::invite::InviteError;
use crate::services::provisioning::ProvisioningError;

/// Wizard position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Welcome,
    BasicInfo,
    ConsentReview,
    Submitted,
    /// Terminal error view for an unusable invite.
    DeadEnd,
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OnboardingStep::Welcome => "welcome",
            OnboardingStep::BasicInfo => "basic_info",
            OnboardingStep::ConsentReview => "consent_review",
            OnboardingStep::Submitted => "submitted",
            OnboardingStep::DeadEnd => "dead_end",
        };
        f.write_str(name)
    }
}

/// Onboarding failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OnboardingError {
    /// A profile field failed validation.
    #[error("{field}: {message}")]
    InvalidField { field: &'static str, message: String },

    /// A required consent was not accepted.
    #[error("Consent required: {0}")]
    ConsentRequired(ConsentKind),

    #[error("Cannot {action} from step {from}")]
    InvalidTransition {
        from: OnboardingStep,
        action: &'static str,
    },

    /// The invite was unusable when the session opened.
    #[error(transparent)]
    Invite(#[from] InviteError),

    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),
}

/// Turns a submitted registration into a member.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn provision(
        &self,
        registration: &PendingRegistration,
        credentials: &Credentials,
    ) -> Result<Member, ProvisioningError>;
}

/// Checks `flags` against what `settings` requires.
///
/// Returns the first unmet consent in display order. Optional or disabled
/// consents never block.
pub fn check_consents(settings: &OnboardingSettings, flags: &ConsentFlags) -> Result<(), ConsentKind> {
    for kind in settings.required_consents() {
        let accepted = match kind {
            ConsentKind::Rules => flags.rules,
            ConsentKind::DataUsage => flags.data_usage,
            ConsentKind::Contract => flags.contract,
            ConsentKind::Marketing => flags.marketing,
        };
        if !accepted {
            return Err(kind);
        }
    }
    Ok(())
}

/// One invitee's pass through the wizard.
#[derive(Debug, Clone)]
pub struct OnboardingSession {
    step: OnboardingStep,
    invite: Option<Invite>,
    settings: OnboardingSettings,
    dead_end: Option<InviteError>,
    profile: ProfileDraft,
    consents: ConsentFlags,
    last_error: Option<String>,
}

impl OnboardingSession {
    /// Opens a session from the result of an invite lookup.
    pub fn open(lookup: Result<(Invite, OnboardingSettings), InviteError>) -> Self {
        match lookup {
            Ok((invite, settings)) => Self {
                step: OnboardingStep::Welcome,
                invite: Some(invite),
                settings,
                dead_end: None,
                profile: ProfileDraft::default(),
                consents: ConsentFlags::default(),
                last_error: None,
            },
            Err(err) => {
                info!(error = %err, "Onboarding opened on an unusable invite");
                Self {
                    step: OnboardingStep::DeadEnd,
                    invite: None,
                    settings: OnboardingSettings::default(),
                    dead_end: Some(err),
                    profile: ProfileDraft::default(),
                    consents: ConsentFlags::default(),
                    last_error: None,
                }
            }
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn invite(&self) -> Option<&Invite> {
        self.invite.as_ref()
    }

    pub fn settings(&self) -> &OnboardingSettings {
        &self.settings
    }

    pub fn profile(&self) -> &ProfileDraft {
        &self.profile
    }

    pub fn consents(&self) -> &ConsentFlags {
        &self.consents
    }

    /// Error from the last failed submission.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn ensure_live(&self) -> Result<(), OnboardingError> {
        match &self.dead_end {
            Some(err) => Err(OnboardingError::Invite(err.clone())),
            None => Ok(()),
        }
    }

    fn transition(&mut self, to: OnboardingStep) {
        debug!(from = %self.step, to = %to, "Onboarding step");
        self.step = to;
    }

    /// `Welcome -> BasicInfo`.
    pub fn start(&mut self) -> Result<(), OnboardingError> {
        self.ensure_live()?;
        match self.step {
            OnboardingStep::Welcome => {
                self.transition(OnboardingStep::BasicInfo);
                Ok(())
            }
            from => Err(OnboardingError::InvalidTransition {
                from,
                action: "start",
            }),
        }
    }

    /// Records basic-info input; only editable on that step.
    pub fn set_profile(&mut self, profile: ProfileDraft) -> Result<(), OnboardingError> {
        self.ensure_live()?;
        match self.step {
            OnboardingStep::BasicInfo => {
                self.profile = profile;
                Ok(())
            }
            from => Err(OnboardingError::InvalidTransition {
                from,
                action: "edit profile",
            }),
        }
    }

    /// `BasicInfo -> ConsentReview`, once name and contact are acceptable.
    pub fn continue_to_consents(&mut self) -> Result<(), OnboardingError> {
        self.ensure_live()?;
        if self.step != OnboardingStep::BasicInfo {
            return Err(OnboardingError::InvalidTransition {
                from: self.step,
                action: "continue",
            });
        }

        shared::validation::validate_person_name(&self.profile.name)
            .map_err(|e| invalid_field("name", e))?;
        shared::validation::validate_contact(&self.profile.contact)
            .map_err(|e| invalid_field("contact", e))?;

        self.transition(OnboardingStep::ConsentReview);
        Ok(())
    }

    /// Records checkbox state; only editable on the consent step.
    pub fn set_consents(&mut self, consents: ConsentFlags) -> Result<(), OnboardingError> {
        self.ensure_live()?;
        match self.step {
            OnboardingStep::ConsentReview => {
                self.consents = consents;
                Ok(())
            }
            from => Err(OnboardingError::InvalidTransition {
                from,
                action: "edit consents",
            }),
        }
    }

    /// One step backwards from `BasicInfo` or `ConsentReview`.
    pub fn back(&mut self) -> Result<(), OnboardingError> {
        self.ensure_live()?;
        let to = match self.step {
            OnboardingStep::BasicInfo => OnboardingStep::Welcome,
            OnboardingStep::ConsentReview => OnboardingStep::BasicInfo,
            from => {
                return Err(OnboardingError::InvalidTransition {
                    from,
                    action: "go back",
                })
            }
        };
        self.transition(to);
        Ok(())
    }

    /// `ConsentReview -> Submitted`.
    ///
    /// Runs the consent guard, then provisions. The provisioner is not called
    /// when a required consent is missing.
    pub async fn submit(
        &mut self,
        provisioner: &dyn Provisioner,
        credentials: &Credentials,
    ) -> Result<Member, OnboardingError> {
        self.ensure_live()?;
        if self.step != OnboardingStep::ConsentReview {
            return Err(OnboardingError::InvalidTransition {
                from: self.step,
                action: "submit",
            });
        }

        if let Err(kind) = check_consents(&self.settings, &self.consents) {
            debug!(consent = %kind, "Submission blocked by consent guard");
            return Err(OnboardingError::ConsentRequired(kind));
        }

        let Some(invite) = self.invite.as_ref() else {
            return Err(OnboardingError::InvalidTransition {
                from: self.step,
                action: "submit",
            });
        };

        let registration = PendingRegistration {
            invite_id: invite.id,
            token: invite.token.clone(),
            profile: self.profile.normalized(),
            consents: self.settings.offered_only(self.consents),
            settings_version: self.settings.version_id.clone(),
        };

        match provisioner.provision(&registration, credentials).await {
            Ok(member) => {
                self.last_error = None;
                self.transition(OnboardingStep::Submitted);
                Ok(member)
            }
            Err(err) => {
                warn!(error = %err, invite_id = %registration.invite_id, "Onboarding submission failed");
                self.last_error = Some(err.to_string());
                Err(OnboardingError::Provisioning(err))
            }
        }
    }
}

fn invalid_field(field: &'static str, err: validator::ValidationError) -> OnboardingError {
    OnboardingError::InvalidField {
        field,
        message: err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string()),
    }
}
