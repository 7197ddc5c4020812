//! House (tenant) models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Maximum length of a generated slug base.
pub const MAX_SLUG_LENGTH: usize = 50;

/// An isolated religious community owning its members, invites and settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct House {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request to create a house.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateHouseRequest {
    #[validate(custom(function = "shared::validation::validate_house_name"))]
    #[validate(length(max = 120, message = "House name must be at most 120 characters"))]
    pub name: String,
}

/// A house as seen by one of its members.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HouseResponse {
    #[serde(flatten)]
    pub house: House,
    pub active: bool,
}

/// Response for `GET /me/house`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActiveHouseResponse {
    pub house_id: Option<Uuid>,
}

/// Request to switch the caller's active house.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchHouseRequest {
    pub house_id: Uuid,
}

/// Folds a house name into a URL slug.
///
/// Lowercases, strips Latin diacritics, collapses every run of other
/// characters into `-` and trims dashes from both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase).map(fold_diacritic) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}

/// Slug candidate for the `attempt`-th try (1-based).
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_strips_accents_and_symbols() {
        assert_eq!(slugify("Ilê Axé Oxóssi"), "ile-axe-oxossi");
        assert_eq!(slugify("  Tenda de Umbanda -- Caboclo!  "), "tenda-de-umbanda-caboclo");
        assert_eq!(slugify("Terreiro São João"), "terreiro-sao-joao");
    }

    #[test]
    fn test_slugify_truncates() {
        let slug = slugify(&"casa ".repeat(30));
        assert!(slug.len() <= MAX_SLUG_LENGTH);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_slug_candidates() {
        assert_eq!(slug_candidate("casa", 1), "casa");
        assert_eq!(slug_candidate("casa", 2), "casa-2");
        assert_eq!(slug_candidate("casa", 5), "casa-5");
    }

    #[test]
    fn test_create_request_validation() {
        assert!(CreateHouseRequest { name: "Ilê".into() }.validate().is_ok());
        assert!(CreateHouseRequest { name: " x ".into() }.validate().is_err());
    }
}
