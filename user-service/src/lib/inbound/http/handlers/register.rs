use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::field_error;
use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use super::UserResponse;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<ApiSuccess<UserResponse>, ApiError> {
    state
        .user_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for registration (raw JSON).
///
/// Missing fields deserialize to `None` so they are reported together with the
/// other field errors.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<CreateUserCommand, ApiError> {
        let mut details = Vec::new();

        let username = Username::new(self.username.unwrap_or_default())
            .map_err(|e| details.push(field_error("username", e)))
            .ok();
        let email = EmailAddress::new(self.email.unwrap_or_default())
            .map_err(|e| details.push(field_error("email", e)))
            .ok();
        let password = Password::new(self.password.unwrap_or_default())
            .map_err(|e| details.push(field_error("password", e)))
            .ok();

        match (username, email, password) {
            (Some(username), Some(email), Some(password)) => {
                Ok(CreateUserCommand::new(username, email, password))
            }
            _ => Err(ApiError::Validation(details)),
        }
    }
}
