//! Per-house onboarding settings document.
//!
//! Describes which consent texts an invitee must read and which of them must
//! be accepted. Every save mints a new `version_id`; members record the
//! version they agreed to.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use validator::Validate;

use super::registration::ConsentFlags;

pub const DEFAULT_RULES_TEXT: &str = "REGRAS DA CASA\n\n\
1) Respeito e convivência: postura respeitosa com todos.\n\
2) Compromissos: pontualidade e comunicação prévia em ausências.\n\
3) Sigilo: informações espirituais e de consulência não devem ser expostas.\n\
4) Uso de imagem e comunicados: conforme consentimento no formulário.";

pub const DEFAULT_LGPD_TEXT: &str = "TERMO DE CIÊNCIA E CONSENTIMENTO (LGPD)\n\n\
Utilizamos seus dados pessoais para: (1) gestão de membros e atividades da casa, \
(2) comunicação sobre agenda, avisos e eventos, (3) segurança e organização interna.\n\n\
Você pode solicitar atualização ou exclusão de dados conforme as regras aplicáveis.";

pub const DEFAULT_CONTRACT_TEXT: &str = "TERMO DE COMPROMISSO\n\n\
Eu, {{NOME_COMPLETO}}, declaro ciência e concordância com as regras e princípios da casa {{CASA_NOME}}.\n\
Data: {{DATA}}";

/// Version id used when a house never saved its settings.
pub const DEFAULT_VERSION_ID: &str = "v_default";

/// A named acknowledgement an invitee may be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentKind {
    Rules,
    /// LGPD data-usage consent; always required.
    DataUsage,
    Marketing,
    Contract,
}

impl ConsentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentKind::Rules => "rules",
            ConsentKind::DataUsage => "lgpd",
            ConsentKind::Marketing => "marketing",
            ConsentKind::Contract => "contract",
        }
    }
}

impl fmt::Display for ConsentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The normalized, versioned onboarding settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OnboardingSettings {
    pub version_id: String,
    pub updated_at: DateTime<Utc>,

    pub rules_enabled: bool,
    pub rules_required: bool,
    pub rules_text: String,

    /// Stored for completeness; `normalized` pins it to `true`.
    pub lgpd_required: bool,
    pub lgpd_text: String,
    pub marketing_opt_in_enabled: bool,

    pub contract_enabled: bool,
    pub contract_required: bool,
    pub contract_text: String,
}

impl Default for OnboardingSettings {
    fn default() -> Self {
        Self {
            version_id: DEFAULT_VERSION_ID.to_string(),
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            rules_enabled: true,
            rules_required: true,
            rules_text: DEFAULT_RULES_TEXT.to_string(),
            lgpd_required: true,
            lgpd_text: DEFAULT_LGPD_TEXT.to_string(),
            marketing_opt_in_enabled: true,
            contract_enabled: false,
            contract_required: true,
            contract_text: DEFAULT_CONTRACT_TEXT.to_string(),
        }
    }
}

impl OnboardingSettings {
    /// Applies the invariants every stored document must satisfy.
    pub fn normalized(mut self) -> Self {
        self.lgpd_required = true;
        self.rules_enabled = true;
        if self.rules_text.trim().is_empty() {
            self.rules_text = DEFAULT_RULES_TEXT.to_string();
        }
        if self.lgpd_text.trim().is_empty() {
            self.lgpd_text = DEFAULT_LGPD_TEXT.to_string();
        }
        self
    }

    /// Whether accepting `kind` is mandatory before submission.
    pub fn is_required(&self, kind: ConsentKind) -> bool {
        match kind {
            ConsentKind::DataUsage => true,
            ConsentKind::Rules => self.rules_enabled && self.rules_required,
            ConsentKind::Contract => self.contract_enabled && self.contract_required,
            ConsentKind::Marketing => false,
        }
    }

    /// Whether `kind` is offered to the invitee at all.
    pub fn is_offered(&self, kind: ConsentKind) -> bool {
        match kind {
            ConsentKind::DataUsage => true,
            ConsentKind::Rules => self.rules_enabled,
            ConsentKind::Contract => self.contract_enabled,
            ConsentKind::Marketing => self.marketing_opt_in_enabled,
        }
    }

    /// Drops acknowledgements for consents this document does not offer.
    pub fn offered_only(&self, flags: ConsentFlags) -> ConsentFlags {
        ConsentFlags {
            rules: flags.rules && self.is_offered(ConsentKind::Rules),
            data_usage: flags.data_usage,
            marketing: flags.marketing && self.is_offered(ConsentKind::Marketing),
            contract: flags.contract && self.is_offered(ConsentKind::Contract),
        }
    }

    /// Consents that must be accepted, in display order.
    pub fn required_consents(&self) -> Vec<ConsentKind> {
        [
            ConsentKind::Rules,
            ConsentKind::DataUsage,
            ConsentKind::Contract,
        ]
        .into_iter()
        .filter(|kind| self.is_required(*kind))
        .collect()
    }

    /// Renders the contract text for one member.
    pub fn render_contract(&self, full_name: &str, house_name: &str, date: &str) -> String {
        self.contract_text
            .replace("{{NOME_COMPLETO}}", full_name)
            .replace("{{CASA_NOME}}", house_name)
            .replace("{{DATA}}", date)
    }

    /// Builds the next version from an edit.
    pub fn next_version(update: UpdateSettingsRequest, now: DateTime<Utc>) -> Self {
        Self {
            version_id: new_version_id(),
            updated_at: now,
            rules_enabled: true,
            rules_required: update.rules_required,
            rules_text: update.rules_text,
            lgpd_required: true,
            lgpd_text: update.lgpd_text,
            marketing_opt_in_enabled: update.marketing_opt_in_enabled,
            contract_enabled: update.contract_enabled,
            contract_required: update.contract_required,
            contract_text: update.contract_text,
        }
        .normalized()
    }
}

/// Mints a version id such as `v_3FA94C0B`.
pub fn new_version_id() -> String {
    let value: u32 = rand::thread_rng().gen();
    format!("v_{:08X}", value)
}

/// Editable part of the settings document.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateSettingsRequest {
    #[serde(default = "default_true")]
    pub rules_required: bool,
    #[validate(length(max = 20000, message = "Rules text is too long"))]
    pub rules_text: String,

    #[validate(length(max = 20000, message = "LGPD text is too long"))]
    pub lgpd_text: String,
    #[serde(default)]
    pub marketing_opt_in_enabled: bool,

    #[serde(default)]
    pub contract_enabled: bool,
    #[serde(default = "default_true")]
    pub contract_required: bool,
    #[serde(default)]
    #[validate(length(max = 20000, message = "Contract text is too long"))]
    pub contract_text: String,
}

fn default_true() -> bool {
    true
}

/// Settings plus a rendered contract preview.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub settings: OnboardingSettings,
    pub required_consents: Vec<ConsentKind>,
    pub contract_preview: Option<String>,
}

/// Converts a legacy settings document into the normalized schema.
///
/// Older clients stored the document either flat (`rulesText`,
/// `rules_text`, `rules`) or nested (`rules.text`, `rules.required`).
/// This runs once at import time; the stored result is always normalized.
pub fn migrate_legacy(raw: &Value, now: DateTime<Utc>) -> OnboardingSettings {
    let defaults = OnboardingSettings::default();

    let text = |section: &str, flat_keys: &[&str], fallback: &str| -> String {
        let nested = ["text", "content", "value"]
            .iter()
            .find_map(|k| raw.get(section).and_then(|s| s.get(*k)).and_then(Value::as_str));
        let flat = flat_keys
            .iter()
            .find_map(|k| raw.get(*k).and_then(Value::as_str));

        nested
            .or(flat)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    let flag = |flat_keys: &[&str], section: &str, nested_keys: &[&str], fallback: bool| -> bool {
        flat_keys
            .iter()
            .find_map(|k| raw.get(*k).and_then(Value::as_bool))
            .or_else(|| {
                nested_keys
                    .iter()
                    .find_map(|k| raw.get(section).and_then(|s| s.get(*k)).and_then(Value::as_bool))
            })
            .unwrap_or(fallback)
    };

    OnboardingSettings {
        version_id: new_version_id(),
        updated_at: now,
        rules_enabled: true,
        rules_required: flag(
            &["rulesRequired", "rules_required"],
            "rules",
            &["required", "isRequired"],
            defaults.rules_required,
        ),
        rules_text: text("rules", &["rulesText", "rules_text", "rules"], DEFAULT_RULES_TEXT),
        lgpd_required: true,
        lgpd_text: text("lgpd", &["lgpdText", "lgpd_text", "lgpd"], DEFAULT_LGPD_TEXT),
        marketing_opt_in_enabled: flag(
            &["lgpdMarketingOptInEnabled", "lgpd_marketing_optin"],
            "lgpd",
            &["marketingOptInEnabled", "optInEnabled"],
            false,
        ),
        contract_enabled: flag(
            &["contractEnabled", "contract_enabled"],
            "contract",
            &["enabled", "isEnabled"],
            false,
        ),
        contract_required: flag(
            &["contractRequired", "contract_required"],
            "contract",
            &["required", "isRequired"],
            false,
        ),
        contract_text: text("contract", &["contractText", "contract_text", "contract"], ""),
    }
    .normalized()
}
