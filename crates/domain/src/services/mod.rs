//! Domain services for Zellador.
//!
//! Services contain business logic that operates on domain models and
//! reaches storage through the traits in [`crate::store`].

pub mod house;
pub mod invite;
pub mod members;
pub mod onboarding;
pub mod provisioning;
pub mod settings;
pub mod tenant;
pub mod token;

pub use house::{HouseError, HouseService};
pub use invite::{check_invite, validate_invite, InviteError, InviteService, InviteValidity};
pub use members::{MemberError, MemberService};
pub use onboarding::{check_consents, OnboardingError, OnboardingSession, OnboardingStep, Provisioner};
pub use provisioning::{ProvisioningError, ProvisioningHandler};
pub use settings::{settings_response, SettingsService};
pub use tenant::{TenantContext, TenantContextResolver, TenantError};
pub use token::generate_invite_token;
