//! Authentication primitives for the user service.
//!
//! - Password hashing (Argon2id, tunable cost)
//! - Stateless identity tokens (HS256 JWT)
//! - Authentication coordination (verify credentials, then issue a token)
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("SecureP@ssw0rd").unwrap();
//! assert!(hasher.verify("SecureP@ssw0rd", &hash).unwrap());
//! ```
//!
//! ## Identity Tokens
//! ```
//! use auth::TokenService;
//! use chrono::Duration;
//!
//! let tokens = TokenService::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24));
//! let issued = tokens.issue("0196bfde-4e25-7061-b4a4-93e5ce8dbcc7", "jack12").unwrap();
//! assert!(tokens.validate(&issued.access_token));
//! assert_eq!(tokens.subject_of(&issued.access_token).unwrap(), "jack12");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, PasswordHasher, TokenService};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(
//!     PasswordHasher::new(),
//!     TokenService::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24)),
//! );
//!
//! // Register: hash password
//! let hash = auth.hash_password("SecureP@ssw0rd").unwrap();
//!
//! // Login: verify and issue token
//! let issued = auth.authenticate("SecureP@ssw0rd", &hash, "user-1", "jack12").unwrap();
//! assert_eq!(issued.token_type, "Bearer");
//!
//! // Every later request: validate token
//! assert!(auth.validate_token(&issued.access_token));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::IdentityClaims;
pub use jwt::IssuedToken;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenService;
pub use jwt::BEARER;
pub use password::HashingParams;
pub use password::PasswordError;
pub use password::PasswordHasher;
