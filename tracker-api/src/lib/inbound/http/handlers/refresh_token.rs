use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::json_body;
use super::ApiError;
use super::ApiSuccess;
use super::SessionData;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

/// Trade a refresh token for a new token pair.
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let request = json_body(payload)?;

    state
        .user_service
        .refresh_session(&request.refresh_token)
        .await
        .map_err(ApiError::from)
        .map(|session| ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}
