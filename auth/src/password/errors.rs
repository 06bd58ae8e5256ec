use thiserror::Error;

/// Error type for password hashing and verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    /// Hash could not be produced (includes an unsupported cost factor).
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored hash is not a valid PHC string.
    #[error("Password verification failed: {0}")]
    VerificationFailed(String),
}
