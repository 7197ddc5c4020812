//! Database connectivity probe.

use async_trait::async_trait;
use domain::error::StoreError;
use domain::store::StoreHealth;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PoolHealth {
    pool: PgPool,
}

impl PoolHealth {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreHealth for PoolHealth {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
