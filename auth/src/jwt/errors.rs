use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    /// Signature did not verify, or the header names a non-HMAC algorithm.
    #[error("Invalid token signature: {0}")]
    InvalidSignature(String),

    #[error("Token is expired")]
    Expired,

    /// Token structure or claims could not be parsed.
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Wrong token type: expected {expected}")]
    WrongTokenType { expected: String },
}
