//! CLI input validation functions.
//!
//! These validators run through clap's `value_parser` attribute so invalid
//! values are rejected at parse time with actionable messages.

use crate::domain;

/// Validate an entity name argument.
///
/// Delegates to the domain validator so the CLI and storage agree on what a
/// legal name is.
///
/// # Errors
///
/// Returns the validation message for clap to display.
pub fn validate_name(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    domain::validate_name(trimmed)?;
    Ok(trimmed.to_string())
}

/// Validate an id-or-name lookup key.
///
/// Keys are resolved against the catalog later; here we only reject input
/// that can never match anything.
///
/// # Errors
///
/// Returns the validation message for clap to display.
pub fn validate_key(s: &str) -> Result<String, String> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err("Lookup key cannot be empty".to_string());
    }

    if trimmed.contains('\n') || trimmed.contains('\r') {
        return Err("Lookup key cannot contain newline characters".to_string());
    }

    Ok(trimmed.to_string())
}

/// Validate a description argument.
///
/// # Errors
///
/// Returns the validation message for clap to display.
pub fn validate_description(s: &str) -> Result<String, String> {
    domain::validate_description(s)?;
    Ok(s.to_string())
}
