use crate::jwt::IdentityClaims;
use crate::jwt::IssuedToken;
use crate::jwt::JwtError;
use crate::jwt::TokenService;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_service: TokenService,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// # Arguments
    /// * `password_hasher` - Hasher used for both new hashes and verification
    /// * `token_service` - Signs tokens after a successful verification
    pub fn new(password_hasher: PasswordHasher, token_service: TokenService) -> Self {
        Self {
            password_hasher,
            token_service,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against a stored hash and, on a match, issue a token for the
    /// identity.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is unusable
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        identity_id: impl ToString,
        username: &str,
    ) -> Result<IssuedToken, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.token_service.issue(identity_id, username)?)
    }

    /// True only for a well-formed, correctly signed, unexpired token.
    pub fn validate_token(&self, token: &str) -> bool {
        self.token_service.validate(token)
    }

    /// Decode and verify a token's claims.
    pub fn claims_of(&self, token: &str) -> Result<IdentityClaims, JwtError> {
        self.token_service.claims_of(token)
    }

    /// Username a valid token was issued to.
    pub fn subject_of(&self, token: &str) -> Result<String, JwtError> {
        self.token_service.subject_of(token)
    }
}
