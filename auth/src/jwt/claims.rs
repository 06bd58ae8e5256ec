use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Value of the `type` claim carried by password reset tokens.
pub const RESET_TOKEN_TYPE: &str = "reset";

/// Claims of access and refresh tokens.
///
/// Both token kinds share the same wire shape; they differ only in lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (user identifier)
    pub sub: String,

    /// Role of the subject at issuance time
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

impl SessionClaims {
    /// Create claims for `user_id` valid for `ttl` from `now`.
    ///
    /// A fresh random `jti` is generated for every call.
    pub fn new(
        user_id: impl ToString,
        role: impl ToString,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Claims of password reset tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResetClaims {
    /// Subject (user identifier)
    pub sub: String,

    /// Token type marker, always [`RESET_TOKEN_TYPE`] for issued tokens.
    /// Absent on other tokens, which deserializes to an empty string.
    #[serde(rename = "type", default)]
    pub token_type: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

impl ResetClaims {
    pub fn new(user_id: impl ToString, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user_id.to_string(),
            token_type: RESET_TOKEN_TYPE.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn is_reset(&self) -> bool {
        self.token_type == RESET_TOKEN_TYPE
    }
}

/// Claims that carry an expiration timestamp.
pub trait Expiring {
    fn expires_at(&self) -> i64;

    /// A token is expired once the current time reaches `exp`.
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.expires_at()
    }
}

impl Expiring for SessionClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

impl Expiring for ResetClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}
