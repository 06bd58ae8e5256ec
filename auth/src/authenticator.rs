use std::sync::Arc;

use crate::jwt::JwtError;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::tokens::TokenPair;
use crate::tokens::TokenService;

/// Login coordinator combining password verification and session token issuance.
///
/// Cheap to clone, so a copy can be moved onto a blocking thread while the
/// password is checked.
#[derive(Clone)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    tokens: Arc<TokenService>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Hasher used to check stored hashes
    /// * `tokens` - Token service that signs the session pair
    pub fn new(password_hasher: PasswordHasher, tokens: Arc<TokenService>) -> Self {
        Self {
            password_hasher,
            tokens,
        }
    }

    /// Verify credentials and issue an access/refresh token pair.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `user_id` - Subject of the issued tokens
    /// * `role` - Role embedded in the issued tokens
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is malformed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: &str,
        role: &str,
    ) -> Result<TokenPair, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.tokens.issue_access_and_refresh(user_id, role)?)
    }
}
