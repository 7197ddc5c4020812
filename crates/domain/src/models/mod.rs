//! Domain models for Zellador.

pub mod account;
pub mod house;
pub mod invite;
pub mod member;
pub mod onboarding_settings;
pub mod registration;

pub use account::Account;
pub use house::House;
pub use invite::{Invite, InviteRole, InviteStatus, NewInvite};
pub use member::{ApprovalStatus, Member, MemberRole, NewMember};
pub use onboarding_settings::{ConsentKind, OnboardingSettings};
pub use registration::{ConsentFlags, Credentials, PendingRegistration, ProfileDraft};
