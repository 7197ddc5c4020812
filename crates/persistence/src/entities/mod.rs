//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod house;
pub mod invite;
pub mod member;
pub mod onboarding_settings;
pub mod user;

pub use house::HouseEntity;
pub use invite::{InviteEntity, InviteRoleDb};
pub use member::{ApprovalStatusDb, MemberEntity, MemberRoleDb};
pub use onboarding_settings::OnboardingSettingsEntity;
pub use user::UserEntity;
