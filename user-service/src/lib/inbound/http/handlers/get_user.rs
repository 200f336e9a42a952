use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::UserResponse;
use crate::domain::user::models::UserId;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn get_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<UserResponse>, ApiError> {
    let user_id = UserId::from_string(&user_id).map_err(UserError::from)?;

    tracing::debug!(caller = %caller.user.id, user_id = %user_id, "Fetching user");

    state
        .user_service
        .get_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
