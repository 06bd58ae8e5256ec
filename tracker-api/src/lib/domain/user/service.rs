use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::JwtError;
use auth::PasswordHasher;
use auth::RateLimiter;
use auth::TokenService;
use chrono::Utc;

use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Role;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserNotifier;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;
use crate::user::validation::validate_password;

const DECOY_PASSWORD: &str = "Decoy!Passw0rd";

/// Request budgets for login attempts and password reset mails, per email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub login_max_attempts: usize,
    pub login_window: Duration,
    pub reset_max_requests: usize,
    pub reset_window: Duration,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            login_max_attempts: 5,
            login_window: Duration::from_secs(15 * 60),
            reset_max_requests: 3,
            reset_window: Duration::from_secs(60 * 60),
        }
    }
}

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR, UN>
where
    UR: UserRepository,
    UN: UserNotifier,
{
    repository: Arc<UR>,
    notifier: Arc<UN>,
    password_hasher: PasswordHasher,
    authenticator: Authenticator,
    tokens: Arc<TokenService>,
    rate_limiter: Arc<RateLimiter>,
    limits: RateLimits,
    /// Hash checked when the email is unknown, at the configured cost.
    decoy_hash: Option<String>,
}

impl<UR, UN> UserService<UR, UN>
where
    UR: UserRepository,
    UN: UserNotifier,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `notifier` - Account notification implementation
    /// * `password_hasher` - Hasher configured with the startup cost factor
    /// * `tokens` - Token service shared with the HTTP layer
    /// * `rate_limiter` - Limiter shared for the process lifetime
    /// * `limits` - Login and reset budgets
    pub fn new(
        repository: Arc<UR>,
        notifier: Arc<UN>,
        password_hasher: PasswordHasher,
        tokens: Arc<TokenService>,
        rate_limiter: Arc<RateLimiter>,
        limits: RateLimits,
    ) -> Self {
        Self {
            repository,
            notifier,
            password_hasher,
            authenticator: Authenticator::new(password_hasher, Arc::clone(&tokens)),
            tokens,
            rate_limiter,
            limits,
            decoy_hash: password_hasher.hash(DECOY_PASSWORD).ok(),
        }
    }

    /// Hash on the blocking pool; Argon2 is CPU-bound.
    async fn hash_password(&self, password: &str) -> Result<String, UserError> {
        let hasher = self.password_hasher;
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| UserError::HashingError(e.to_string()))?
            .map_err(|e| UserError::HashingError(e.to_string()))
    }

    async fn check_rate_limit(
        &self,
        key: &str,
        max_requests: usize,
        window: Duration,
    ) -> Result<(), UserError> {
        if self
            .rate_limiter
            .is_allowed(key, max_requests, window)
            .await
        {
            return Ok(());
        }

        let retry_after = self.rate_limiter.remaining_cooldown(key, window).await;
        tracing::warn!(key, retry_after_secs = retry_after.as_secs(), "Rate limit hit");
        Err(UserError::TooManyRequests { retry_after })
    }

    /// Run one verify against the decoy hash, so a login for an unknown
    /// email takes as long as one with a wrong password.
    async fn verify_decoy(&self, password: &str) {
        let Some(hash) = self.decoy_hash.clone() else {
            return;
        };
        let hasher = self.password_hasher;
        let password = password.to_string();

        let _ = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await;
    }

    fn open_session(&self, user: User) -> Result<AuthenticatedSession, UserError> {
        let tokens = self
            .tokens
            .issue_access_and_refresh(&user.id.to_string(), user.role.as_str())?;

        Ok(AuthenticatedSession {
            user: user.without_password(),
            tokens,
        })
    }
}

fn subject_id(sub: &str) -> Result<UserId, UserError> {
    UserId::from_string(sub)
        .map_err(|_| UserError::Token(JwtError::Malformed("subject is not a user id".to_string())))
}

#[async_trait]
impl<UR, UN> UserServicePort for UserService<UR, UN>
where
    UR: UserRepository,
    UN: UserNotifier,
{
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        let email = EmailAddress::new(&command.email)?;
        validate_password(&command.password)?;

        if self
            .repository
            .find_by_email(email.as_str())
            .await?
            .is_some()
        {
            tracing::warn!(email = %email, "Registration rejected: email already in use");
            return Err(UserError::EmailInUse(email.to_string()));
        }

        let role = match self.repository.count().await? {
            0 => Role::Admin,
            _ => Role::User,
        };

        let password_hash = self.hash_password(&command.password).await?;
        let now = Utc::now();

        let new_user = NewUser {
            email,
            password_hash,
            name: command.name,
            role,
            currency: command.currency,
            profile: command.profile,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create(new_user).await?;
        tracing::info!(user_id = %created.id, role = %created.role, "User registered");

        Ok(created.without_password())
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, UserError> {
        let email = email.to_lowercase();
        self.check_rate_limit(
            &format!("login:{}", email),
            self.limits.login_max_attempts,
            self.limits.login_window,
        )
        .await?;

        let Some(user) = self.repository.find_by_email(&email).await? else {
            self.verify_decoy(password).await;
            tracing::warn!("Login failed for unknown email");
            return Err(UserError::InvalidCredentials);
        };

        let authenticator = self.authenticator.clone();
        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let user_id = user.id.to_string();
        let role = user.role.as_str();

        let tokens = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, &user_id, role)
        })
        .await
        .map_err(|e| UserError::HashingError(e.to_string()))?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
            AuthenticationError::PasswordError(err) => UserError::HashingError(err.to_string()),
            AuthenticationError::JwtError(err) => UserError::Token(err),
        });

        match tokens {
            Ok(tokens) => {
                tracing::info!(user_id = %user.id, "User logged in");
                Ok(AuthenticatedSession {
                    user: user.without_password(),
                    tokens,
                })
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Login failed");
                Err(e)
            }
        }
    }

    async fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> Result<AuthenticatedSession, UserError> {
        let claims = self.tokens.validate(refresh_token)?;
        let user_id = subject_id(&claims.sub)?;

        let user = self
            .repository
            .find_by_id(&user_id)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        self.open_session(user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .map(User::without_password)
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(name) = command.name {
            user.name = Some(name);
        }
        if let Some(currency) = command.currency {
            user.currency = Some(currency);
        }
        if let Some(profile) = command.profile {
            user.profile = profile;
        }
        user.updated_at = Utc::now().max(user.created_at);

        let updated = self.repository.update(user).await?;
        tracing::info!(user_id = %updated.id, "User updated");

        Ok(updated.without_password())
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), UserError> {
        let email = email.to_lowercase();
        self.check_rate_limit(
            &format!("reset:{}", email),
            self.limits.reset_max_requests,
            self.limits.reset_window,
        )
        .await?;

        let Some(user) = self.repository.find_by_email(&email).await? else {
            tracing::info!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = self.tokens.issue_reset_token(&user.id.to_string())?;
        self.notifier
            .send_password_reset(user.email.as_str(), user.display_name(), &token)
            .await;
        tracing::info!(user_id = %user.id, "Password reset requested");

        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), UserError> {
        let claims = self.tokens.validate_reset_token(token)?;
        validate_password(new_password)?;
        let user_id = subject_id(&claims.sub)?;

        let mut user = self
            .repository
            .find_by_id(&user_id)
            .await?
            .ok_or(UserError::NotFound(user_id.to_string()))?;

        user.password_hash = self.hash_password(new_password).await?;
        user.updated_at = Utc::now().max(user.created_at);

        let updated = self.repository.update(user).await?;
        self.notifier
            .send_password_changed(updated.email.as_str(), updated.display_name())
            .await;
        tracing::info!(user_id = %updated.id, "Password reset completed");

        Ok(())
    }
}
