use std::any::Any;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiErrorBody;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub const AUTHENTICATION_REQUIRED: &str = "Authentication required to access this resource";

/// Identity resolved from a bearer token, stored in request extensions.
///
/// As an extractor it rejects with 401 when the request carried no usable token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized(AUTHENTICATION_REQUIRED.to_string()))
    }
}

/// Resolve the caller's identity before any handler runs.
///
/// Public paths pass straight through. Elsewhere a missing or invalid token leaves the
/// request unauthenticated; rejecting it is up to handlers that extract
/// [`AuthenticatedUser`]. Store failures while resolving the identity are errors.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.public_paths.is_public(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    if let Some(token) = bearer_token(req.headers()) {
        if let Some(user) = resolve_identity(&state, token).await? {
            tracing::debug!(user_id = %user.id, "Request authenticated");
            req.extensions_mut().insert(AuthenticatedUser { user });
        }
    }

    Ok(next.run(req).await)
}

async fn resolve_identity(state: &AppState, token: &str) -> Result<Option<User>, ApiError> {
    let subject = match state.authenticator.subject_of(token) {
        Ok(subject) => subject,
        Err(e) => {
            tracing::debug!(reason = %e, "Bearer token rejected");
            return Ok(None);
        }
    };

    let Ok(username) = Username::new(subject) else {
        tracing::warn!("Token subject is not a valid username");
        return Ok(None);
    };

    match state.user_service.get_user_by_username(&username).await {
        Ok(user) => Ok(Some(user)),
        Err(UserError::NotFoundByUsername(_)) => {
            tracing::info!(username = %username, "Token subject no longer exists");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Token from an `Authorization: Bearer <token>` header, if there is a usable one.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(auth::BEARER)?.strip_prefix(' ')?.trim();
    (!token.is_empty()).then_some(token)
}

/// Outermost error boundary.
///
/// Stamps the request path onto error bodies and gives bare error responses from the
/// framework, such as 405, the same shape.
pub async fn error_envelope(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;

    let body = match response.extensions_mut().remove::<ApiErrorBody>() {
        Some(body) => body,
        None if response.status().is_client_error() || response.status().is_server_error() => {
            ApiErrorBody::for_status(response.status())
        }
        None => return response,
    };

    let (parts, _) = response.into_parts();
    let mut rendered = body.with_path(path).into_response();
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rendered.headers_mut().append(name.clone(), value.clone());
        }
    }
    rendered
}

/// Turn a handler panic into a 500 in the uniform shape.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    ApiError::InternalServerError(format!("Handler panicked: {}", detail)).into_response()
}
