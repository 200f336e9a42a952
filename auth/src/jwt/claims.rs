use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Claims carried by an identity token.
///
/// `sub` holds the username; the identity id travels in its own claim so that
/// consumers never have to parse it out of the subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Subject (username)
    pub sub: String,

    /// Identity identifier
    pub id: String,

    /// Username, duplicated for consumers that ignore `sub`
    pub username: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl IdentityClaims {
    /// Build claims for an identity, valid from `issued_at` for `lifetime`.
    ///
    /// # Errors
    /// * `EncodingFailed` - The expiry falls outside the representable time range
    pub fn for_identity(
        identity_id: impl ToString,
        username: impl Into<String>,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, JwtError> {
        let username = username.into();
        let expiration = issued_at.checked_add_signed(lifetime).ok_or_else(|| {
            JwtError::EncodingFailed(format!("token lifetime {} overflows expiry", lifetime))
        })?;

        Ok(Self {
            sub: username.clone(),
            id: identity_id.to_string(),
            username,
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        })
    }

    /// Expiry as a UTC timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
