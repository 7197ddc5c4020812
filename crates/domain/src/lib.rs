//! Domain layer for the Zellador backend.
//!
//! This crate contains:
//! - Domain models (invites, houses, members, onboarding settings)
//! - Store traits the persistence layer implements, plus an in-memory backend
//! - Business services: invite issuance and validation, the onboarding
//!   session, provisioning, tenant context resolution and member approval

pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod store;
