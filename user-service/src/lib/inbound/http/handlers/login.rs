use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::field_error;
use super::serialize_timestamp;
use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use super::UserResponse;
use crate::domain::user::models::AuthSession;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::Password;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<ApiSuccess<LoginResponse>, ApiError> {
    state
        .user_service
        .authenticate(body.try_into_credentials()?)
        .await
        .map_err(ApiError::from)
        .map(|session| ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

impl LoginRequest {
    fn try_into_credentials(self) -> Result<Credentials, ApiError> {
        let mut details = Vec::new();

        let username = Username::new(self.username.unwrap_or_default())
            .map_err(|e| details.push(field_error("username", e)))
            .ok();
        let password = Password::presented(self.password.unwrap_or_default())
            .map_err(|e| details.push(field_error("password", e)))
            .ok();

        match (username, password) {
            (Some(username), Some(password)) => Ok(Credentials::new(username, password)),
            _ => Err(ApiError::Validation(details)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

impl From<AuthSession> for LoginResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: (&session.user).into(),
            token: session.token,
            token_type: session.token_type,
            expires_at: session.expires_at,
        }
    }
}
