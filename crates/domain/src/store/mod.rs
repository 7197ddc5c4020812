//! Storage seams.
//!
//! Services reach durable state only through these traits. The persistence
//! crate implements them over PostgreSQL; [`memory::MemoryStore`] implements
//! them in process.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::house::House;
use crate::models::invite::{Invite, InviteStatusFilter, NewInvite};
use crate::models::member::{ApprovalStatus, Member, MemberInsert, MemberReview, NewMember};
use crate::models::{Account, OnboardingSettings};

pub use memory::{FailPoint, MemoryStore};

/// Invitation records.
#[async_trait]
pub trait InviteStore: Send + Sync {
    /// Persists a new invite. A token collision surfaces as `StoreError::Conflict`.
    async fn create(&self, invite: NewInvite) -> Result<Invite, StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<Invite>, StoreError>;

    async fn find_by_id(&self, id: Uuid, tenant_id: Uuid) -> Result<Option<Invite>, StoreError>;

    /// Invites of one house, newest first, filtered by status at `now`.
    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        filter: InviteStatusFilter,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invite>, StoreError>;

    async fn count_by_tenant(
        &self,
        tenant_id: Uuid,
        filter: InviteStatusFilter,
        now: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// Sets `used_at` only if it is still unset.
    ///
    /// Returns `false` when another caller consumed the invite first.
    async fn claim(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Removes an unused invite. Returns `false` if nothing was removed.
    async fn delete_unused(&self, id: Uuid, tenant_id: Uuid) -> Result<bool, StoreError>;
}

/// Failure from the authentication provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Accounts and credential checks.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Creates an account. Fails with `EmailTaken` if the email is in use.
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Account, AccountError>;

    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AccountError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Registers the account, or signs in when the email already exists.
    ///
    /// Repeating the call with the same credentials yields the same account.
    async fn create_or_authenticate(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Account, AccountError> {
        match self.register(email, password, display_name).await {
            Err(AccountError::EmailTaken) => self.authenticate(email, password).await,
            other => other,
        }
    }
}

/// Per-account profile holding the active house pointer.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn active_tenant(&self, user_id: Uuid) -> Result<Option<Uuid>, StoreError>;

    /// Upserts the profile row with the given pointer.
    async fn set_active_tenant(
        &self,
        user_id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> Result<(), StoreError>;
}

/// House memberships.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Inserts a member unless one already exists for the same invite or the
    /// same house/account pair, in which case that row is returned untouched.
    async fn create_for_invite(&self, member: NewMember) -> Result<MemberInsert, StoreError>;

    async fn find_by_id(&self, id: Uuid, tenant_id: Uuid) -> Result<Option<Member>, StoreError>;

    async fn find_by_tenant_and_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>, StoreError>;

    /// Memberships of an account, oldest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Member>, StoreError>;

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<Member>, StoreError>;

    async fn set_active(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        active: bool,
    ) -> Result<Option<Member>, StoreError>;

    /// Applies a review to a member that is still pending.
    ///
    /// Returns `None` when no pending member matched.
    async fn review(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        review: MemberReview,
        reviewer: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Member>, StoreError>;
}

/// Values needed to persist a new house.
#[derive(Debug, Clone)]
pub struct NewHouse {
    pub name: String,
    pub slug: String,
    pub owner_id: Uuid,
}

/// Houses (tenants).
#[async_trait]
pub trait HouseStore: Send + Sync {
    /// Persists a house. A slug collision surfaces as `StoreError::Conflict`.
    async fn create(&self, house: NewHouse) -> Result<House, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<House>, StoreError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError>;

    /// Houses the account holds a non-rejected membership in, oldest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<House>, StoreError>;
}

/// Versioned onboarding settings documents.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Latest saved version for a house.
    async fn current(&self, tenant_id: Uuid) -> Result<Option<OnboardingSettings>, StoreError>;

    /// Appends a new version.
    async fn save(
        &self,
        tenant_id: Uuid,
        settings: &OnboardingSettings,
        saved_by: Uuid,
    ) -> Result<(), StoreError>;
}

/// Connectivity probe for health checks.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
}

/// The full set of stores a running service needs.
#[derive(Clone)]
pub struct Stores {
    pub invites: Arc<dyn InviteStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub members: Arc<dyn MemberStore>,
    pub houses: Arc<dyn HouseStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    /// Fresh, empty in-process stores.
    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    /// Shares one in-process store across every seam.
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            invites: store.clone(),
            accounts: store.clone(),
            profiles: store.clone(),
            members: store.clone(),
            houses: store.clone(),
            settings: store.clone(),
            health: store,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
