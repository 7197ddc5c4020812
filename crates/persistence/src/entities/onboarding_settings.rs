//! Onboarding settings entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::OnboardingSettings;
use sqlx::FromRow;

/// Database row mapping for one version in the onboarding_settings table.
#[derive(Debug, Clone, FromRow)]
pub struct OnboardingSettingsEntity {
    pub version_id: String,
    pub updated_at: DateTime<Utc>,
    pub rules_enabled: bool,
    pub rules_required: bool,
    pub rules_text: String,
    pub lgpd_required: bool,
    pub lgpd_text: String,
    pub marketing_opt_in_enabled: bool,
    pub contract_enabled: bool,
    pub contract_required: bool,
    pub contract_text: String,
}

impl From<OnboardingSettingsEntity> for OnboardingSettings {
    fn from(entity: OnboardingSettingsEntity) -> Self {
        Self {
            version_id: entity.version_id,
            updated_at: entity.updated_at,
            rules_enabled: entity.rules_enabled,
            rules_required: entity.rules_required,
            rules_text: entity.rules_text,
            lgpd_required: entity.lgpd_required,
            lgpd_text: entity.lgpd_text,
            marketing_opt_in_enabled: entity.marketing_opt_in_enabled,
            contract_enabled: entity.contract_enabled,
            contract_required: entity.contract_required,
            contract_text: entity.contract_text,
        }
        .normalized()
    }
}
