//! Persistence layer for the Zellador backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - PostgreSQL implementations of the domain store traits

pub mod db;
pub mod entities;
pub mod repositories;

use std::sync::Arc;

use domain::store::Stores;
use sqlx::PgPool;

use repositories::{
    AccountRepository, HouseRepository, InviteRepository, MemberRepository,
    OnboardingSettingsRepository, PoolHealth, ProfileRepository,
};

/// Builds every store over one connection pool.
pub fn pg_stores(pool: PgPool) -> Stores {
    Stores {
        invites: Arc::new(InviteRepository::new(pool.clone())),
        accounts: Arc::new(AccountRepository::new(pool.clone())),
        profiles: Arc::new(ProfileRepository::new(pool.clone())),
        members: Arc::new(MemberRepository::new(pool.clone())),
        houses: Arc::new(HouseRepository::new(pool.clone())),
        settings: Arc::new(OnboardingSettingsRepository::new(pool.clone())),
        health: Arc::new(PoolHealth::new(pool)),
    }
}
