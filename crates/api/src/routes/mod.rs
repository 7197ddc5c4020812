//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod houses;
pub mod invites;
pub mod me;
pub mod members;
pub mod onboarding;
pub mod settings;
