use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::claims::IdentityClaims;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Scheme name clients put in front of the token in the `Authorization` header.
pub const BEARER: &str = "Bearer";

/// A freshly signed identity token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates stateless, time-bounded identity tokens.
///
/// There is no session store: a token is valid exactly when its signature checks
/// out and its expiry has not passed.
pub struct TokenService {
    handler: JwtHandler,
    lifetime: Duration,
}

impl TokenService {
    /// # Arguments
    /// * `secret` - HMAC signing key
    /// * `lifetime` - How long an issued token stays valid
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            handler: JwtHandler::new(secret),
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Sign a token for an identity.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed or the expiry is out of range
    pub fn issue(
        &self,
        identity_id: impl ToString,
        username: &str,
    ) -> Result<IssuedToken, JwtError> {
        let claims =
            IdentityClaims::for_identity(identity_id, username, Utc::now(), self.lifetime)?;
        let access_token = self.handler.encode(&claims)?;

        Ok(IssuedToken {
            access_token,
            token_type: BEARER,
            expires_at: claims.expires_at(),
        })
    }

    /// True only for a well-formed, correctly signed, unexpired token.
    pub fn validate(&self, token: &str) -> bool {
        self.claims_of(token).is_ok()
    }

    /// Decode and verify all claims.
    pub fn claims_of(&self, token: &str) -> Result<IdentityClaims, JwtError> {
        self.handler.decode(token)
    }

    /// Username the token was issued to.
    ///
    /// # Errors
    /// Any `JwtError` the token fails validation with
    pub fn subject_of(&self, token: &str) -> Result<String, JwtError> {
        self.claims_of(token).map(|claims| claims.sub)
    }
}
