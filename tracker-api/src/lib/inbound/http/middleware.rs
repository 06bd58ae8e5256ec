use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Caller identity, stored in request extensions by [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Users may act on their own record; admins on any record.
    pub fn ensure_can_access(&self, target: &UserId) -> Result<(), UserError> {
        if self.role == Role::Admin || &self.user_id == target {
            return Ok(());
        }
        tracing::warn!(
            caller = %self.user_id,
            target = %target,
            "Access to another user's record denied"
        );
        Err(UserError::Forbidden)
    }
}

/// Middleware that validates the bearer token and records the caller.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req)?;

    let claims = state.tokens.validate_access(token).map_err(|e| {
        tracing::warn!(error = %e, "JWT validation failed");
        ApiError::Unauthorized("invalid or expired token".to_string())
    })?;

    let user_id = UserId::from_string(&claims.sub).map_err(|e| {
        tracing::warn!(error = %e, "Token subject is not a user id");
        ApiError::Unauthorized("invalid token format".to_string())
    })?;

    let role = claims.role.parse::<Role>().map_err(|e| {
        tracing::warn!(error = %e, "Token carries an unknown role");
        ApiError::Unauthorized("invalid token format".to_string())
    })?;

    req.extensions_mut()
        .insert(AuthenticatedUser { user_id, role });

    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Result<&str, ApiError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("invalid Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            ApiError::Unauthorized(
                "invalid Authorization header format, expected: Bearer <token>".to_string(),
            )
        })
}
