//! Repository for houses.

use async_trait::async_trait;
use domain::error::StoreError;
use domain::models::House;
use domain::store::{HouseStore, NewHouse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::HouseEntity;

/// Repository for house operations.
#[derive(Clone)]
pub struct HouseRepository {
    pool: PgPool,
}

impl HouseRepository {
    /// Creates a new house repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HouseStore for HouseRepository {
    async fn create(&self, house: NewHouse) -> Result<House, StoreError> {
        let entity = sqlx::query_as::<_, HouseEntity>(
            r#"
            INSERT INTO houses (name, slug, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, owner_id, created_at
            "#,
        )
        .bind(&house.name)
        .bind(&house.slug)
        .bind(house.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<House>, StoreError> {
        let entity = sqlx::query_as::<_, HouseEntity>(
            "SELECT id, name, slug, owner_id, created_at FROM houses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM houses WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<House>, StoreError> {
        let entities = sqlx::query_as::<_, HouseEntity>(
            r#"
            SELECT h.id, h.name, h.slug, h.owner_id, h.created_at
            FROM houses h
            JOIN members m ON m.tenant_id = h.id
            WHERE m.user_id = $1 AND m.approval_status <> 'rejected'
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }
}
