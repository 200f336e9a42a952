use std::fmt::Display;

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde::Serializer;

use crate::domain::user::models::User;
use crate::user::errors::UserError;

pub mod get_user;
pub mod login;
pub mod register;

const INVALID_LOGIN_MESSAGE: &str = "Invalid username or password";
const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";
const VALIDATION_MESSAGE: &str =
    "Input validation failed - please check the request format and field requirements";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

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
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// JSON request body whose rejections render in the uniform error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest {
        message: String,
        details: Vec<String>,
    },
    /// One entry per rejected field, formatted `field: reason`.
    Validation(Vec<String>),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    InternalServerError(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_body(self) -> ApiErrorBody {
        let status = self.status();
        let (error, message, details) = match self {
            ApiError::BadRequest { message, details } => ("Bad Request", message, details),
            ApiError::Validation(details) => {
                ("Validation Error", VALIDATION_MESSAGE.to_string(), details)
            }
            ApiError::Unauthorized(message) => ("Unauthorized", message, Vec::new()),
            ApiError::Forbidden(message) => ("Forbidden", message, Vec::new()),
            ApiError::NotFound(message) => ("Not Found", message, Vec::new()),
            ApiError::Conflict(message) => ("Conflict", message, Vec::new()),
            ApiError::InternalServerError(cause) => {
                tracing::error!(error = %cause, "Request failed");
                (
                    "Internal Server Error",
                    INTERNAL_ERROR_MESSAGE.to_string(),
                    Vec::new(),
                )
            }
        };

        ApiErrorBody::new(status, error, message, details)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_body().into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidUserId(_) => ApiError::bad_request(err.to_string()),
            UserError::InvalidUsername(e) => ApiError::Validation(vec![field_error("username", e)]),
            UserError::InvalidEmail(e) => ApiError::Validation(vec![field_error("email", e)]),
            UserError::InvalidPassword(e) => ApiError::Validation(vec![field_error("password", e)]),
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::NotFoundByUsername(_) | UserError::InvalidCredentials => {
                ApiError::Unauthorized(INVALID_LOGIN_MESSAGE.to_string())
            }
            UserError::UsernameAlreadyExists(_) | UserError::EmailAlreadyExists(_) => {
                ApiError::Conflict(err.to_string())
            }
            UserError::Credential(_) | UserError::DatabaseError(_) | UserError::Unknown(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let (message, detail) = match &rejection {
            JsonRejection::JsonSyntaxError(_) => (
                "Malformed JSON",
                "Your request contains invalid JSON syntax".to_string(),
            ),
            JsonRejection::JsonDataError(e) => match unknown_field(&e.body_text()) {
                Some(field) => (
                    "Unknown field in request",
                    format!("The field '{}' is not expected in this request", field),
                ),
                None => (
                    "Request format error",
                    "Please check the format of your request".to_string(),
                ),
            },
            _ => (
                "Invalid request format",
                "The request could not be processed".to_string(),
            ),
        };

        tracing::debug!(rejection = %rejection.body_text(), "Request body rejected");

        ApiError::BadRequest {
            message: message.to_string(),
            details: vec![detail],
        }
    }
}

/// Field name from a serde "unknown field `name`" message.
fn unknown_field(text: &str) -> Option<&str> {
    let start = text.find("unknown field `")? + "unknown field `".len();
    let len = text[start..].find('`')?;
    Some(&text[start..start + len])
}

pub(crate) fn field_error(field: &str, err: impl Display) -> String {
    format!("{}: {}", field, err)
}

/// Uniform error body.
///
/// The rendered response also carries a copy in its extensions so the outer envelope
/// middleware can stamp the request path, which handlers never see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ApiErrorBody {
    pub fn new(status: StatusCode, error: &str, message: String, details: Vec<String>) -> Self {
        Self {
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            status: status.as_u16(),
            error: error.to_string(),
            message,
            path: String::new(),
            details: (!details.is_empty()).then_some(details),
        }
    }

    /// Body for a failure that did not come from an `ApiError`, such as an
    /// unsupported method.
    pub fn for_status(status: StatusCode) -> Self {
        let error = match status {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::CONFLICT => "Conflict",
            s if s.is_server_error() => "Internal Server Error",
            s => s.canonical_reason().unwrap_or("Error"),
        };
        let message = if status.is_server_error() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        };

        Self::new(status, error, message, Vec::new())
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

impl IntoResponse for ApiErrorBody {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.clone())).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Response timestamps: UTC wall-clock time to the microsecond, without offset.
pub const RESPONSE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

pub(crate) fn serialize_timestamp<S>(
    value: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&value.format(RESPONSE_TIMESTAMP_FORMAT))
}

/// Public projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
