//! Onboarding settings versions.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::onboarding_settings::{
    migrate_legacy, OnboardingSettings, SettingsResponse, UpdateSettingsRequest,
};
use crate::store::SettingsStore;

#[derive(Clone)]
pub struct SettingsService {
    settings: Arc<dyn SettingsStore>,
}

impl SettingsService {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Latest version, or the defaults when the house never saved one.
    pub async fn current(&self, tenant_id: Uuid) -> Result<OnboardingSettings, StoreError> {
        Ok(self
            .settings
            .current(tenant_id)
            .await?
            .map(OnboardingSettings::normalized)
            .unwrap_or_default())
    }

    /// Saves an edit as a new version.
    pub async fn save(
        &self,
        tenant_id: Uuid,
        saved_by: Uuid,
        update: UpdateSettingsRequest,
    ) -> Result<OnboardingSettings, StoreError> {
        let settings = OnboardingSettings::next_version(update, Utc::now());
        self.settings.save(tenant_id, &settings, saved_by).await?;
        info!(tenant_id = %tenant_id, version_id = %settings.version_id, "Onboarding settings saved");
        Ok(settings)
    }

    /// Converts a legacy document and saves it as a new version.
    pub async fn import_legacy(
        &self,
        tenant_id: Uuid,
        saved_by: Uuid,
        raw: &Value,
    ) -> Result<OnboardingSettings, StoreError> {
        let settings = migrate_legacy(raw, Utc::now());
        self.settings.save(tenant_id, &settings, saved_by).await?;
        info!(tenant_id = %tenant_id, version_id = %settings.version_id, "Legacy onboarding settings imported");
        Ok(settings)
    }
}

/// Builds the admin view of a settings document.
pub fn settings_response(settings: OnboardingSettings, house_name: &str) -> SettingsResponse {
    let contract_preview = settings.contract_enabled.then(|| {
        settings.render_contract(
            "Nome Completo",
            house_name,
            &Utc::now().format("%d/%m/%Y").to_string(),
        )
    });
    SettingsResponse {
        required_consents: settings.required_consents(),
        contract_preview,
        settings,
    }
}
