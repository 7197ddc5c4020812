//! Shared utilities for the Zellador backend.
//!
//! Used by every other crate in the workspace:
//! - Password hashing with Argon2id
//! - Access/refresh session tokens (JWT)
//! - Field validators for onboarding forms

pub mod jwt;
pub mod password;
pub mod validation;
