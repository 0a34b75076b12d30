use garde::Validate;

use crate::error::{AppError, Result};

/// Validates login input.
///
/// Only blank input is refused here: whether the credentials are actually
/// correct is the upstream API's authority, not ours.
///
/// # Arguments
///
/// * `email` - The submitted email address.
/// * `password` - The submitted password.
///
/// # Returns
///
/// A `Result<()>` indicating whether the input is acceptable.
pub fn validate_login(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    if password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    Ok(())
}

#[derive(Validate)]
struct ResetEmail<'a> {
    #[garde(email)]
    email: &'a str,
}

/// Checks whether `email` is a plausible address to send a reset link to.
pub fn is_valid_email(email: &str) -> bool {
    ResetEmail { email }.validate().is_ok()
}
