use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::json_body;
use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::Profile;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

/// Create an account.
///
/// Role and verification state are assigned by the server. Any `role` or
/// `is_verified` sent by the client is ignored.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let request = json_body(payload)?;

    state
        .user_service
        .register_user(request.into())
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub name: Option<String>,
    pub currency: Option<String>,
    #[serde(default)]
    pub profile: Profile,
}

impl From<RegisterRequest> for RegisterUserCommand {
    fn from(request: RegisterRequest) -> Self {
        Self {
            email: request.email,
            password: request.password,
            name: request.name,
            currency: request.currency,
            profile: request.profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_assigned_fields_are_ignored() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{
                "email": "a@example.com",
                "password": "Str0ng!Pass",
                "role": "admin",
                "is_verified": true,
                "profile": {"phone": "555-0100"}
            }"#,
        )
        .unwrap();

        let command = RegisterUserCommand::from(request);
        assert_eq!(command.email, "a@example.com");
        assert_eq!(command.profile.phone.as_deref(), Some("555-0100"));
        assert!(command.name.is_none());
    }

    #[test]
    fn test_missing_credentials_default_to_empty() {
        let request: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert!(request.email.is_empty());
        assert!(request.password.is_empty());
    }
}
