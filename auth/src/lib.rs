//! Authentication utilities library
//!
//! Security primitives for the tracker API:
//! - Password hashing (Argon2id, configurable cost)
//! - JWT signing and validation (HMAC only)
//! - Session and password reset token issuance
//! - Sliding-window rate limiting
//!
//! The service defines its own domain errors and adapts these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_cost(1);
//! let hash = hasher.hash("Secur3P@ss").unwrap();
//! assert!(hasher.verify("Secur3P@ss", &hash).unwrap());
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::TokenService;
//!
//! let tokens = TokenService::new(b"secret_key_at_least_32_bytes_long!");
//! let pair = tokens.issue_access_and_refresh("user123", "user").unwrap();
//! let claims = tokens.validate(&pair.access_token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! ```
//!
//! ## Rate Limiting
//! ```
//! use std::time::Duration;
//! use auth::RateLimiter;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let limiter = RateLimiter::new();
//! assert!(limiter.is_allowed("login:alice@example.com", 1, Duration::from_secs(60)).await);
//! assert!(!limiter.is_allowed("login:alice@example.com", 1, Duration::from_secs(60)).await);
//! # });
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod password;
pub mod rate_limit;
pub mod tokens;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::ResetClaims;
pub use jwt::SessionClaims;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use rate_limit::CleanupTask;
pub use rate_limit::RateLimiter;
pub use tokens::TokenPair;
pub use tokens::TokenService;
