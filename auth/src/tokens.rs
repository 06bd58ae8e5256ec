use std::sync::Arc;

use chrono::Duration;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::jwt::Expiring;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::ResetClaims;
use crate::jwt::SessionClaims;
use crate::jwt::RESET_TOKEN_TYPE;

/// Access token lifetime.
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;
/// Refresh token lifetime.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;
/// Password reset token lifetime.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 15;

/// Kind reported when a longer-lived session token is used as an access token.
pub const ACCESS_TOKEN_KIND: &str = "access";

/// Access and refresh token issued together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and validates the service's signed tokens.
///
/// Holds the shared signing secret (via [`JwtHandler`]) and the clock used
/// for `iat`/`exp`. Expiry is evaluated against that same clock, so a token
/// is rejected as soon as `now >= exp`.
pub struct TokenService {
    jwt: JwtHandler,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            jwt: JwtHandler::new(secret),
            clock,
        }
    }

    /// Issue an access token (15 minutes) and a refresh token (7 days).
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue_access_and_refresh(
        &self,
        user_id: &str,
        role: &str,
    ) -> Result<TokenPair, JwtError> {
        let now = self.clock.now();

        let access = SessionClaims::new(
            user_id,
            role,
            now,
            Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
        );
        let refresh = SessionClaims::new(
            user_id,
            role,
            now,
            Duration::days(REFRESH_TOKEN_TTL_DAYS),
        );

        let pair = TokenPair {
            access_token: self.jwt.encode(&access)?,
            refresh_token: self.jwt.encode(&refresh)?,
        };
        tracing::debug!(user_id, role, "session tokens issued");
        Ok(pair)
    }

    /// Validate an access or refresh token.
    ///
    /// # Errors
    /// * `InvalidSignature` - Non-HMAC algorithm or bad signature
    /// * `Expired` - Current time is at or past `exp`
    /// * `Malformed` - Token or claims cannot be parsed
    pub fn validate(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let claims: SessionClaims = self.jwt.decode(token)?;
        self.ensure_fresh(&claims)?;
        Ok(claims)
    }

    /// Validate a token presented as an access token.
    ///
    /// Access and refresh tokens share one claim shape. They are told apart by
    /// their signed lifetime: anything living longer than an access token is
    /// refused here.
    ///
    /// # Errors
    /// Same as [`TokenService::validate`], plus `WrongTokenType` for refresh tokens.
    pub fn validate_access(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let claims = self.validate(token)?;

        let access_lifetime = Duration::minutes(ACCESS_TOKEN_TTL_MINUTES).num_seconds();
        if claims.exp - claims.iat > access_lifetime {
            return Err(JwtError::WrongTokenType {
                expected: ACCESS_TOKEN_KIND.to_string(),
            });
        }

        Ok(claims)
    }

    /// Issue a password reset token (15 minutes) carrying `type = "reset"`.
    pub fn issue_reset_token(&self, user_id: &str) -> Result<String, JwtError> {
        let claims = ResetClaims::new(
            user_id,
            self.clock.now(),
            Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        );
        self.jwt.encode(&claims)
    }

    /// Validate a password reset token.
    ///
    /// # Errors
    /// Same as [`TokenService::validate`], plus `WrongTokenType` when the
    /// `type` claim is missing or not `reset`.
    pub fn validate_reset_token(&self, token: &str) -> Result<ResetClaims, JwtError> {
        let claims: ResetClaims = self.jwt.decode(token)?;
        self.ensure_fresh(&claims)?;

        if !claims.is_reset() {
            return Err(JwtError::WrongTokenType {
                expected: RESET_TOKEN_TYPE.to_string(),
            });
        }

        Ok(claims)
    }

    fn ensure_fresh<C: Expiring>(&self, claims: &C) -> Result<(), JwtError> {
        if claims.is_expired(self.clock.now()) {
            return Err(JwtError::Expired);
        }
        Ok(())
    }
}
