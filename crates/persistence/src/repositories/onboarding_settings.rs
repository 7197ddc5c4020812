//! Repository for versioned onboarding settings.

use async_trait::async_trait;
use domain::error::StoreError;
use domain::models::OnboardingSettings;
use domain::store::SettingsStore;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::OnboardingSettingsEntity;

/// Repository for onboarding settings operations.
#[derive(Clone)]
pub struct OnboardingSettingsRepository {
    pool: PgPool,
}

impl OnboardingSettingsRepository {
    /// Creates a new onboarding settings repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for OnboardingSettingsRepository {
    async fn current(&self, tenant_id: Uuid) -> Result<Option<OnboardingSettings>, StoreError> {
        let entity = sqlx::query_as::<_, OnboardingSettingsEntity>(
            r#"
            SELECT version_id, updated_at, rules_enabled, rules_required, rules_text,
                   lgpd_required, lgpd_text, marketing_opt_in_enabled,
                   contract_enabled, contract_required, contract_text
            FROM onboarding_settings
            WHERE tenant_id = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    async fn save(
        &self,
        tenant_id: Uuid,
        settings: &OnboardingSettings,
        saved_by: Uuid,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO onboarding_settings (
                tenant_id, version_id, rules_enabled, rules_required, rules_text,
                lgpd_required, lgpd_text, marketing_opt_in_enabled,
                contract_enabled, contract_required, contract_text, saved_by, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(tenant_id)
        .bind(&settings.version_id)
        .bind(settings.rules_enabled)
        .bind(settings.rules_required)
        .bind(&settings.rules_text)
        .bind(settings.lgpd_required)
        .bind(&settings.lgpd_text)
        .bind(settings.marketing_opt_in_enabled)
        .bind(settings.contract_enabled)
        .bind(settings.contract_required)
        .bind(&settings.contract_text)
        .bind(saved_by)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
