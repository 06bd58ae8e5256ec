use async_trait::async_trait;

use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// The first user ever registered becomes `admin`, everyone else `user`.
    ///
    /// # Arguments
    /// * `command` - Raw registration input
    ///
    /// # Returns
    /// Created user entity with the password hash blanked
    ///
    /// # Errors
    /// * `InvalidEmail` - Email missing or malformed
    /// * `WeakPassword` - Password fails a complexity rule
    /// * `EmailInUse` - Email is already registered
    /// * `RepositoryError` - Lookup or count failed
    /// * `HashingError` - Password hashing failed
    /// * `PersistenceError` - Insert failed
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Verify credentials and open a session.
    ///
    /// # Errors
    /// * `TooManyRequests` - Login attempts for this email exceeded the limit
    /// * `InvalidCredentials` - Unknown email or wrong password
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, UserError>;

    /// Exchange a refresh token for a new token pair.
    ///
    /// # Errors
    /// * `Token` - Token invalid or expired
    /// * `InvalidCredentials` - Subject no longer exists
    async fn refresh_session(&self, refresh_token: &str)
        -> Result<AuthenticatedSession, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `RepositoryError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Update name, currency and profile of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `PersistenceError` - Database operation failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;

    /// Delete existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `RepositoryError` - Database operation failed
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;

    /// Send a password reset link to `email` if it belongs to a user.
    ///
    /// Unknown addresses succeed silently.
    ///
    /// # Errors
    /// * `TooManyRequests` - Reset requests for this email exceeded the limit
    async fn request_password_reset(&self, email: &str) -> Result<(), UserError>;

    /// Set a new password using a reset token.
    ///
    /// # Errors
    /// * `Token` - Token invalid, expired or not a reset token
    /// * `WeakPassword` - New password fails a complexity rule
    /// * `NotFound` - Subject no longer exists
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage and assign its identifier.
    ///
    /// # Errors
    /// * `EmailInUse` - Unique constraint on email violated
    /// * `PersistenceError` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `RepositoryError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by lowercase email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `RepositoryError` - Database operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Number of stored users.
    ///
    /// # Errors
    /// * `RepositoryError` - Database operation failed
    async fn count(&self) -> Result<u64, UserError>;

    /// Replace all mutable fields of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmailInUse` - Unique constraint on email violated
    /// * `PersistenceError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `RepositoryError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}

/// Outbound notifications about account events.
///
/// Delivery problems are handled inside the adapter; callers never see them.
#[async_trait]
pub trait UserNotifier: Send + Sync + 'static {
    /// Send the password reset link carrying `token`.
    async fn send_password_reset(&self, to: &str, name: &str, token: &str);

    /// Confirm that the password of `to` was changed.
    async fn send_password_changed(&self, to: &str, name: &str);
}
