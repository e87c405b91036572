use regex::Regex;

use crate::utils::errors::AppError;

/// GitHub account names: 1-39 characters, alphanumeric and hyphens, no
/// leading, trailing, or doubled hyphen.
pub fn validate_account(account: &str) -> Result<(), AppError> {
    if account.is_empty() || account.len() > 39 {
        return Err(AppError::Validation(
            "Account name must be between 1 and 39 characters".to_string(),
        ));
    }

    let pattern = Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,37}[a-zA-Z0-9])?$")
        .expect("Invalid regex pattern");

    if !pattern.is_match(account) {
        return Err(AppError::Validation(
            "Invalid account name: only alphanumeric characters and hyphens are allowed, and it cannot start or end with a hyphen".to_string(),
        ));
    }

    if account.contains("--") {
        return Err(AppError::Validation(
            "Account name cannot contain consecutive hyphens".to_string(),
        ));
    }

    Ok(())
}
