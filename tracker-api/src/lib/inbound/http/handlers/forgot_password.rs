use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::json_body;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

const ACCEPTED_MESSAGE: &str = "If the email is registered, a password reset link has been sent";

/// Start a password reset.
///
/// The answer is the same whether or not the address is registered.
pub async fn forgot_password(
    State(state): State<AppState>,
    payload: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<ApiSuccess<ForgotPasswordResponseData>, ApiError> {
    let request = json_body(payload)?;

    state
        .user_service
        .request_password_reset(&request.email)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::ACCEPTED,
        ForgotPasswordResponseData {
            message: ACCEPTED_MESSAGE.to_string(),
        },
    ))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForgotPasswordResponseData {
    pub message: String,
}
