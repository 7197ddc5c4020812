//! Field validators shared by request DTOs.
//!
//! Plugged into `#[validate(custom(function = ...))]` attributes.

use validator::ValidationError;

use crate::password::{is_acceptable_length, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

/// Minimum number of characters in a trimmed person name.
pub const MIN_NAME_LENGTH: usize = 3;

/// Minimum number of characters in a trimmed contact value (phone/WhatsApp).
pub const MIN_CONTACT_LENGTH: usize = 8;

/// Minimum number of characters in a trimmed house name.
pub const MIN_HOUSE_NAME_LENGTH: usize = 2;

fn trimmed_len(value: &str) -> usize {
    value.trim().chars().count()
}

fn error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates a person's display name.
pub fn validate_person_name(name: &str) -> Result<(), ValidationError> {
    if trimmed_len(name) >= MIN_NAME_LENGTH {
        Ok(())
    } else {
        Err(error(
            "name_too_short",
            format!("Name must have at least {} characters", MIN_NAME_LENGTH),
        ))
    }
}

/// Validates a contact value such as a WhatsApp number.
pub fn validate_contact(contact: &str) -> Result<(), ValidationError> {
    let value = contact.trim();

    if value.chars().count() < MIN_CONTACT_LENGTH {
        return Err(error(
            "contact_too_short",
            format!("Contact must have at least {} characters", MIN_CONTACT_LENGTH),
        ));
    }

    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '(' | ')' | '+' | '-' | '.');
    if !value.chars().all(allowed) {
        return Err(error(
            "contact_invalid",
            "Contact may only contain digits, spaces and ( ) + - .".to_string(),
        ));
    }

    Ok(())
}

/// Validates the name given to a new house.
pub fn validate_house_name(name: &str) -> Result<(), ValidationError> {
    if trimmed_len(name) >= MIN_HOUSE_NAME_LENGTH {
        Ok(())
    } else {
        Err(error("house_name_too_short", "Invalid house name".to_string()))
    }
}

/// Validates a new account password against the length policy.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if is_acceptable_length(password) {
        Ok(())
    } else {
        Err(error(
            "password_length",
            format!(
                "Password must be between {} and {} characters",
                MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
            ),
        ))
    }
}
