//! Input rules for registration and password changes.
//!
//! Both validators are pure and report only the first rule that fails.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::user::errors::EmailError;
use crate::user::errors::PasswordRuleError;

/// Minimum password length in bytes.
pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

static LOWERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("[a-z]").expect("valid regex"));
static UPPERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("[A-Z]").expect("valid regex"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]").expect("valid regex"));
static SPECIAL: Lazy<Regex> = Lazy::new(|| Regex::new("[@$!%*?&#]").expect("valid regex"));
static ALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[A-Za-z0-9@$!%*?&#]+$").expect("valid regex"));

/// Check that `email` looks like `local@domain.tld`.
///
/// # Errors
/// * `Required` - Input is empty
/// * `InvalidFormat` - Input does not match the address pattern
pub fn validate_email(email: &str) -> Result<(), EmailError> {
    if email.is_empty() {
        return Err(EmailError::Required);
    }
    if !EMAIL.is_match(email) {
        return Err(EmailError::InvalidFormat);
    }
    Ok(())
}

/// Check `password` against the complexity rules, in order.
pub fn validate_password(password: &str) -> Result<(), PasswordRuleError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(PasswordRuleError::TooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if !LOWERCASE.is_match(password) {
        return Err(PasswordRuleError::MissingLowercase);
    }
    if !UPPERCASE.is_match(password) {
        return Err(PasswordRuleError::MissingUppercase);
    }
    if !DIGIT.is_match(password) {
        return Err(PasswordRuleError::MissingDigit);
    }
    if !SPECIAL.is_match(password) {
        return Err(PasswordRuleError::MissingSpecial);
    }
    if !ALLOWED.is_match(password) {
        return Err(PasswordRuleError::InvalidCharacters);
    }
    Ok(())
}
