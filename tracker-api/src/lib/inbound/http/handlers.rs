use auth::JwtError;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::Profile;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::user::errors::UserError;

pub mod delete_user;
pub mod forgot_password;
pub mod get_user;
pub mod health;
pub mod login;
pub mod refresh_token;
pub mod register;
pub mod reset_password;
pub mod update_user;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    TooManyRequests { message: String, retry_after_secs: u64 },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, retry_after) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::TooManyRequests {
                message,
                retry_after_secs,
            } => (StatusCode::TOO_MANY_REQUESTS, message, Some(retry_after_secs)),
        };

        let body = Json(ApiResponseBody::new_error(status, message));
        match retry_after {
            Some(secs) => (status, [(header::RETRY_AFTER, secs.to_string())], body).into_response(),
            None => (status, body).into_response(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidEmail(_) | UserError::WeakPassword(_) => {
                ApiError::UnprocessableEntity(err.to_string())
            }
            UserError::InvalidIdentifier(_) => ApiError::BadRequest(err.to_string()),
            UserError::EmailInUse(_) => ApiError::Conflict(err.to_string()),
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            UserError::Forbidden => ApiError::Forbidden(err.to_string()),
            UserError::TooManyRequests { retry_after } => ApiError::TooManyRequests {
                message: err.to_string(),
                retry_after_secs: retry_after.as_secs().max(1),
            },
            UserError::Token(JwtError::EncodingFailed(_)) => {
                tracing::error!(error = %err, "Token signing failed");
                ApiError::InternalServerError(err.to_string())
            }
            UserError::Token(_) => ApiError::Unauthorized(err.to_string()),
            UserError::RepositoryError(_)
            | UserError::HashingError(_)
            | UserError::PersistenceError(_) => {
                tracing::error!(error = %err, "Request failed on infrastructure error");
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

/// Unwrap a JSON body, reporting any rejection as 400.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Public view of a user. Carries no password field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub profile: Profile,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            name: user.name.clone(),
            role: user.role,
            currency: user.currency.clone(),
            profile: user.profile.clone(),
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Body returned by login and token refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionData {
    pub user: UserData,
    pub access_token: String,
    pub refresh_token: String,
}

impl From<AuthenticatedSession> for SessionData {
    fn from(session: AuthenticatedSession) -> Self {
        Self {
            user: (&session.user).into(),
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::user::errors::EmailError;
    use crate::user::errors::PasswordRuleError;
    use crate::user::errors::UserIdError;

    fn status_of(err: UserError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_user_error_status_mapping() {
        assert_eq!(
            status_of(UserError::InvalidEmail(EmailError::InvalidFormat)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(UserError::WeakPassword(PasswordRuleError::MissingDigit)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(UserError::InvalidIdentifier(UserIdError::InvalidFormat(
                "x".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(UserError::EmailInUse("a@b.co".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(UserError::NotFound("id".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(UserError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(UserError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(UserError::Token(JwtError::Expired)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(UserError::Token(JwtError::EncodingFailed("x".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(UserError::RepositoryError("down".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(UserError::HashingError("cost".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(UserError::PersistenceError("full".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_too_many_requests_sets_retry_after() {
        let response = ApiError::from(UserError::TooManyRequests {
            retry_after: Duration::from_secs(42),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }
}
