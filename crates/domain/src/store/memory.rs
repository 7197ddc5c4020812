//! In-process implementation of every store trait.
//!
//! Used for local development without a database and by tests. Failure
//! points can be armed to make an operation keep returning
//! `StoreError::Unavailable`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{
    AccountError, AccountStore, HouseStore, InviteStore, MemberStore, NewHouse, ProfileStore,
    SettingsStore, StoreHealth,
};
use crate::error::StoreError;
use crate::models::house::House;
use crate::models::invite::{Invite, InviteStatusFilter, NewInvite};
use crate::models::member::{ApprovalStatus, Member, MemberInsert, MemberReview, NewMember};
use crate::models::{Account, OnboardingSettings};

/// Operations that can be forced to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    CreateInvite,
    FindInvite,
    ClaimInvite,
    RegisterAccount,
    SetActiveTenant,
    CreateMember,
    SaveSettings,
    Ping,
}

struct StoredAccount {
    account: Account,
    password_hash: String,
}

#[derive(Default)]
struct State {
    invites: Vec<Invite>,
    accounts: Vec<StoredAccount>,
    profiles: HashMap<Uuid, Option<Uuid>>,
    members: Vec<Member>,
    houses: Vec<House>,
    settings: HashMap<Uuid, Vec<OnboardingSettings>>,
    failures: HashSet<FailPoint>,
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes every subsequent call of `point` fail until cleared.
    pub fn fail_on(&self, point: FailPoint) {
        self.state().failures.insert(point);
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Overwrites an invite's expiry.
    pub fn set_invite_expiry(&self, id: Uuid, expires_at: Option<DateTime<Utc>>) -> bool {
        let mut state = self.state();
        match state.invites.iter_mut().find(|i| i.id == id) {
            Some(invite) => {
                invite.expires_at = expires_at;
                true
            }
            None => false,
        }
    }

    /// Removes a house, leaving its memberships and profile pointers behind.
    pub fn remove_house(&self, id: Uuid) -> bool {
        let mut state = self.state();
        let before = state.houses.len();
        state.houses.retain(|h| h.id != id);
        state.houses.len() != before
    }

    pub fn member_count(&self, tenant_id: Uuid) -> usize {
        self.state()
            .members
            .iter()
            .filter(|m| m.tenant_id == tenant_id)
            .count()
    }

    pub fn account_count(&self) -> usize {
        self.state().accounts.len()
    }
}

impl State {
    fn check(&self, point: FailPoint) -> Result<(), StoreError> {
        if self.failures.contains(&point) {
            Err(StoreError::Unavailable(format!("injected failure: {:?}", point)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl InviteStore for MemoryStore {
    async fn create(&self, invite: NewInvite) -> Result<Invite, StoreError> {
        let mut state = self.state();
        state.check(FailPoint::CreateInvite)?;

        if state.invites.iter().any(|i| i.token == invite.token) {
            return Err(StoreError::Conflict("invites_token_key".into()));
        }

        let invite = Invite {
            id: Uuid::new_v4(),
            token: invite.token,
            tenant_id: invite.tenant_id,
            role: invite.role,
            created_by: invite.created_by,
            created_at: Utc::now(),
            expires_at: invite.expires_at,
            used_at: None,
        };
        state.invites.push(invite.clone());
        Ok(invite)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Invite>, StoreError> {
        let state = self.state();
        state.check(FailPoint::FindInvite)?;
        Ok(state.invites.iter().find(|i| i.token == token).cloned())
    }

    async fn find_by_id(&self, id: Uuid, tenant_id: Uuid) -> Result<Option<Invite>, StoreError> {
        let state = self.state();
        state.check(FailPoint::FindInvite)?;
        Ok(state
            .invites
            .iter()
            .find(|i| i.id == id && i.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        filter: InviteStatusFilter,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invite>, StoreError> {
        let state = self.state();
        let mut invites: Vec<Invite> = state
            .invites
            .iter()
            .filter(|i| i.tenant_id == tenant_id && filter.matches(i.status_at(now)))
            .cloned()
            .collect();
        invites.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(invites
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_by_tenant(
        &self,
        tenant_id: Uuid,
        filter: InviteStatusFilter,
        now: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let state = self.state();
        Ok(state
            .invites
            .iter()
            .filter(|i| i.tenant_id == tenant_id && filter.matches(i.status_at(now)))
            .count() as i64)
    }

    async fn claim(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut state = self.state();
        state.check(FailPoint::ClaimInvite)?;

        match state
            .invites
            .iter_mut()
            .find(|i| i.id == id && i.used_at.is_none())
        {
            Some(invite) => {
                invite.used_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_unused(&self, id: Uuid, tenant_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state();
        let before = state.invites.len();
        state
            .invites
            .retain(|i| !(i.id == id && i.tenant_id == tenant_id && i.used_at.is_none()));
        Ok(state.invites.len() != before)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Account, AccountError> {
        let email = email.trim().to_lowercase();
        {
            let state = self.state();
            state.check(FailPoint::RegisterAccount)?;
            if state.accounts.iter().any(|a| a.account.email == email) {
                return Err(AccountError::EmailTaken);
            }
        }

        // Hash outside the lock; argon2 is slow by design.
        let password_hash = shared::password::hash_password(password)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut state = self.state();
        if state.accounts.iter().any(|a| a.account.email == email) {
            return Err(AccountError::EmailTaken);
        }
        let account = Account {
            id: Uuid::new_v4(),
            email,
            display_name: display_name.trim().to_string(),
        };
        state.accounts.push(StoredAccount {
            account: account.clone(),
            password_hash,
        });
        Ok(account)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AccountError> {
        let email = email.trim().to_lowercase();
        let (account, password_hash) = {
            let state = self.state();
            match state.accounts.iter().find(|a| a.account.email == email) {
                Some(stored) => (stored.account.clone(), stored.password_hash.clone()),
                None => return Err(AccountError::InvalidCredentials),
            }
        };

        match shared::password::verify_password(password, &password_hash) {
            Ok(true) => Ok(account),
            Ok(false) => Err(AccountError::InvalidCredentials),
            Err(e) => Err(StoreError::Unavailable(e.to_string()).into()),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self
            .state()
            .accounts
            .iter()
            .find(|a| a.account.id == id)
            .map(|a| a.account.clone()))
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn active_tenant(&self, user_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        Ok(self.state().profiles.get(&user_id).copied().flatten())
    }

    async fn set_active_tenant(
        &self,
        user_id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        state.check(FailPoint::SetActiveTenant)?;
        state.profiles.insert(user_id, tenant_id);
        Ok(())
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn create_for_invite(&self, member: NewMember) -> Result<MemberInsert, StoreError> {
        let mut state = self.state();
        state.check(FailPoint::CreateMember)?;

        let existing = state.members.iter().find(|m| {
            (member.invite_id.is_some() && m.invite_id == member.invite_id)
                || (m.tenant_id == member.tenant_id && m.user_id == member.user_id)
        });
        if let Some(existing) = existing {
            return Ok(MemberInsert::Existing(existing.clone()));
        }

        let created = Member {
            id: Uuid::new_v4(),
            tenant_id: member.tenant_id,
            user_id: member.user_id,
            invite_id: member.invite_id,
            role: member.role,
            name: member.name,
            contact: member.contact,
            email: member.email,
            active: member.active,
            approval_status: member.approval_status,
            consents: member.consents,
            settings_version: member.settings_version,
            reviewed_at: None,
            reviewed_by: None,
            rejection_reason: None,
            created_at: Utc::now(),
        };
        state.members.push(created.clone());
        Ok(MemberInsert::Created(created))
    }

    async fn find_by_id(&self, id: Uuid, tenant_id: Uuid) -> Result<Option<Member>, StoreError> {
        Ok(self
            .state()
            .members
            .iter()
            .find(|m| m.id == id && m.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_by_tenant_and_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>, StoreError> {
        Ok(self
            .state()
            .members
            .iter()
            .find(|m| m.tenant_id == tenant_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Member>, StoreError> {
        let mut members: Vec<Member> = self
            .state()
            .members
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(members)
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<Member>, StoreError> {
        let mut members: Vec<Member> = self
            .state()
            .members
            .iter()
            .filter(|m| m.tenant_id == tenant_id)
            .filter(|m| status.map_or(true, |s| m.approval_status == s))
            .cloned()
            .collect();
        members.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(members)
    }

    async fn set_active(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        active: bool,
    ) -> Result<Option<Member>, StoreError> {
        let mut state = self.state();
        Ok(state
            .members
            .iter_mut()
            .find(|m| m.id == id && m.tenant_id == tenant_id)
            .map(|member| {
                member.active = active;
                member.clone()
            }))
    }

    async fn review(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        review: MemberReview,
        reviewer: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Member>, StoreError> {
        let mut state = self.state();
        Ok(state
            .members
            .iter_mut()
            .find(|m| {
                m.id == id && m.tenant_id == tenant_id && m.approval_status == ApprovalStatus::Pending
            })
            .map(|member| {
                match review {
                    MemberReview::Approve => {
                        member.approval_status = ApprovalStatus::Approved;
                        member.active = true;
                    }
                    MemberReview::Reject { reason } => {
                        member.approval_status = ApprovalStatus::Rejected;
                        member.active = false;
                        member.rejection_reason = reason;
                    }
                }
                member.reviewed_at = Some(now);
                member.reviewed_by = Some(reviewer);
                member.clone()
            }))
    }
}

#[async_trait]
impl HouseStore for MemoryStore {
    async fn create(&self, house: NewHouse) -> Result<House, StoreError> {
        let mut state = self.state();
        if state.houses.iter().any(|h| h.slug == house.slug) {
            return Err(StoreError::Conflict("houses_slug_key".into()));
        }

        let house = House {
            id: Uuid::new_v4(),
            name: house.name,
            slug: house.slug,
            owner_id: house.owner_id,
            created_at: Utc::now(),
        };
        state.houses.push(house.clone());
        Ok(house)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<House>, StoreError> {
        Ok(self.state().houses.iter().find(|h| h.id == id).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        Ok(self.state().houses.iter().any(|h| h.slug == slug))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<House>, StoreError> {
        let state = self.state();
        let mut memberships: Vec<&Member> = state
            .members
            .iter()
            .filter(|m| m.user_id == user_id && m.approval_status != ApprovalStatus::Rejected)
            .collect();
        memberships.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(memberships
            .into_iter()
            .filter_map(|m| state.houses.iter().find(|h| h.id == m.tenant_id).cloned())
            .collect())
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn current(&self, tenant_id: Uuid) -> Result<Option<OnboardingSettings>, StoreError> {
        Ok(self
            .state()
            .settings
            .get(&tenant_id)
            .and_then(|versions| versions.last().cloned()))
    }

    async fn save(
        &self,
        tenant_id: Uuid,
        settings: &OnboardingSettings,
        _saved_by: Uuid,
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        state.check(FailPoint::SaveSettings)?;
        state
            .settings
            .entry(tenant_id)
            .or_default()
            .push(settings.clone());
        Ok(())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.state().check(FailPoint::Ping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invite::InviteRole;
    use crate::models::member::{ConsentRecord, MemberRole};

    fn new_invite(token: &str, tenant_id: Uuid) -> NewInvite {
        NewInvite {
            token: token.to_string(),
            tenant_id,
            role: InviteRole::Medium,
            created_by: None,
            expires_at: None,
        }
    }

    fn new_member(tenant_id: Uuid, user_id: Uuid, invite_id: Option<Uuid>) -> NewMember {
        NewMember {
            tenant_id,
            user_id,
            invite_id,
            role: MemberRole::Medium,
            name: "Maria Souza".into(),
            contact: Some("11987654321".into()),
            email: "maria@example.com".into(),
            active: true,
            approval_status: ApprovalStatus::Approved,
            consents: ConsentRecord::founder(),
            settings_version: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_token_is_conflict() {
        let store = MemoryStore::new();
        let tenant = Uuid::new_v4();
        InviteStore::create(&store, new_invite("AAAA", tenant)).await.unwrap();
        let err = InviteStore::create(&store, new_invite("AAAA", tenant))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_claim_only_once() {
        let store = MemoryStore::new();
        let invite = InviteStore::create(&store, new_invite("BBBB", Uuid::new_v4()))
            .await
            .unwrap();
        assert!(store.claim(invite.id, Utc::now()).await.unwrap());
        assert!(!store.claim(invite.id, Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_unused_keeps_used_invites() {
        let store = MemoryStore::new();
        let tenant = Uuid::new_v4();
        let invite = InviteStore::create(&store, new_invite("CCCC", tenant))
            .await
            .unwrap();
        store.claim(invite.id, Utc::now()).await.unwrap();
        assert!(!store.delete_unused(invite.id, tenant).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_member_is_idempotent_per_invite() {
        let store = MemoryStore::new();
        let tenant = Uuid::new_v4();
        let invite_id = Uuid::new_v4();

        let first = store
            .create_for_invite(new_member(tenant, Uuid::new_v4(), Some(invite_id)))
            .await
            .unwrap();
        let second = store
            .create_for_invite(new_member(tenant, Uuid::new_v4(), Some(invite_id)))
            .await
            .unwrap();

        assert!(matches!(first, MemberInsert::Created(_)));
        assert!(matches!(second, MemberInsert::Existing(_)));
        assert_eq!(store.member_count(tenant), 1);
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let store = MemoryStore::new();
        let account = store
            .create_or_authenticate("Ana@Example.com", "senha123", "Ana Lima")
            .await
            .unwrap();
        let again = store
            .create_or_authenticate("ana@example.com", "senha123", "Ana Lima")
            .await
            .unwrap();
        assert_eq!(account.id, again.id);
        assert_eq!(store.account_count(), 1);

        let wrong = store
            .create_or_authenticate("ana@example.com", "outra-senha", "Ana Lima")
            .await;
        assert_eq!(wrong, Err(AccountError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_fail_point() {
        let store = MemoryStore::new();
        store.fail_on(FailPoint::Ping);
        assert!(store.ping().await.is_err());
        store.clear_failures();
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_review_only_pending() {
        let store = MemoryStore::new();
        let tenant = Uuid::new_v4();
        let member = store
            .create_for_invite(new_member(tenant, Uuid::new_v4(), None))
            .await
            .unwrap()
            .into_member();

        let result = store
            .review(member.id, tenant, MemberReview::Approve, Uuid::new_v4(), Utc::now())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
