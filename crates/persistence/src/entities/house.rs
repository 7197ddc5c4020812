//! House entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::House;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the houses table.
#[derive(Debug, Clone, FromRow)]
pub struct HouseEntity {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<HouseEntity> for House {
    fn from(entity: HouseEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            slug: entity.slug,
            owner_id: entity.owner_id,
            created_at: entity.created_at,
        }
    }
}
