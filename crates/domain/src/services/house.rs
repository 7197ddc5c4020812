//! House creation and listing.

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::house::{slug_candidate, slugify, House, HouseResponse};
use crate::models::member::{ApprovalStatus, ConsentRecord, MemberRole, NewMember};
use crate::models::Account;
use crate::store::{NewHouse, Stores};

/// Slug used when a name has no letters or digits.
const FALLBACK_SLUG: &str = "casa";

/// Suffixes tried before giving up on a slug; also bounds insert retries.
const MAX_SLUG_ATTEMPTS: u32 = 50;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HouseError {
    #[error("Could not find a free slug for this name")]
    SlugExhausted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct HouseService {
    stores: Stores,
}

impl HouseService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    async fn free_slug(&self, base: &str) -> Result<String, HouseError> {
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let candidate = slug_candidate(base, attempt);
            if !self.stores.houses.slug_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(HouseError::SlugExhausted)
    }

    /// Creates a house owned by `owner`, who becomes its admin and is
    /// switched into it.
    pub async fn create(&self, owner: &Account, name: &str) -> Result<House, HouseError> {
        let name = name.trim();
        let base = match slugify(name) {
            slug if slug.is_empty() => FALLBACK_SLUG.to_string(),
            slug => slug,
        };

        let mut created = None;
        for _ in 0..MAX_SLUG_ATTEMPTS {
            let slug = self.free_slug(&base).await?;
            let result = self
                .stores
                .houses
                .create(NewHouse {
                    name: name.to_string(),
                    slug: slug.clone(),
                    owner_id: owner.id,
                })
                .await;

            match result {
                Ok(house) => {
                    created = Some(house);
                    break;
                }
                // Taken between the check and the insert.
                Err(err) if err.is_conflict() => {
                    warn!(slug = %slug, "House slug taken concurrently, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
        let house = created.ok_or(HouseError::SlugExhausted)?;

        self.stores
            .members
            .create_for_invite(NewMember {
                tenant_id: house.id,
                user_id: owner.id,
                invite_id: None,
                role: MemberRole::Admin,
                name: owner.display_name.clone(),
                contact: None,
                email: owner.email.clone(),
                active: true,
                approval_status: ApprovalStatus::Approved,
                consents: ConsentRecord::founder(),
                settings_version: None,
            })
            .await?;

        self.stores
            .profiles
            .set_active_tenant(owner.id, Some(house.id))
            .await?;

        info!(house_id = %house.id, slug = %house.slug, owner_id = %owner.id, "House created");
        Ok(house)
    }

    /// Houses of `user_id`, flagging the active one.
    pub async fn list(
        &self,
        user_id: Uuid,
        active: Option<Uuid>,
    ) -> Result<Vec<HouseResponse>, HouseError> {
        Ok(self
            .stores
            .houses
            .list_for_user(user_id)
            .await?
            .into_iter()
            .map(|house| HouseResponse {
                active: Some(house.id) == active,
                house,
            })
            .collect())
    }
}
