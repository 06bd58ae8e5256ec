use std::time::Duration;

use auth::JwtError;
use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("email is required")]
    Required,

    #[error("invalid email format")]
    InvalidFormat,
}

/// First password complexity rule a candidate password fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordRuleError {
    #[error("password too short: must be at least {min} characters")]
    TooShort { min: usize },

    #[error("missing lowercase letter")]
    MissingLowercase,

    #[error("missing uppercase letter")]
    MissingUppercase,

    #[error("missing digit")]
    MissingDigit,

    #[error("missing special character (@$!%*?&#)")]
    MissingSpecial,

    #[error("contains invalid characters")]
    InvalidCharacters,
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Input validation errors (automatically converted via #[from])
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Weak password: {0}")]
    WeakPassword(#[from] PasswordRuleError),

    #[error("Invalid user ID: {0}")]
    InvalidIdentifier(#[from] UserIdError),

    // Domain-level errors
    #[error("Email already in use: {0}")]
    EmailInUse(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access to this user is forbidden")]
    Forbidden,

    #[error("Too many requests, retry in {} seconds", .retry_after.as_secs().max(1))]
    TooManyRequests { retry_after: Duration },

    #[error("Invalid token: {0}")]
    Token(#[from] JwtError),

    // Infrastructure errors
    #[error("Database error: {0}")]
    RepositoryError(String),

    #[error("Failed to hash password: {0}")]
    HashingError(String),

    #[error("Failed to persist user: {0}")]
    PersistenceError(String),
}
