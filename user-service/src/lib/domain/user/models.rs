use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// `password_hash` never leaves the service: it is left out of `Debug` output and
/// every outbound projection is built field by field without it.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// A user that has not been stored yet.
///
/// The store assigns the identifier and both timestamps when it persists it.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl NewUser {
    /// Stamp the record with a fresh identifier and a single creation instant.
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: UserId::new(),
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// User unique identifier type.
///
/// UUIDv7: the leading bits are a millisecond timestamp, so identifiers sort by
/// creation time while the random tail keeps them unguessable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new time-ordered user ID.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is not blank and is 3-50 characters long.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 50;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Blank` - Empty or whitespace only
    /// * `InvalidLength` - Fewer than 3 or more than 50 characters
    pub fn new(username: String) -> Result<Self, UsernameError> {
        if username.trim().is_empty() {
            return Err(UsernameError::Blank);
        }

        let length = username.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&length) {
            return Err(UsernameError::InvalidLength {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `Blank` - Empty or whitespace only
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        if email.trim().is_empty() {
            return Err(EmailError::Blank);
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password, alive only while a single request is processed.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;
    const MAX_LENGTH: usize = 50;
    const SPECIAL_CHARACTERS: &'static str = "@#$%^&+=!";

    /// Accept a new password only if it satisfies the full policy: 8-50 characters
    /// with at least one digit, one ASCII lowercase letter, one ASCII uppercase
    /// letter and one of `@#$%^&+=!`.
    ///
    /// # Errors
    /// * `Blank` - Empty or whitespace only
    /// * `InvalidLength` - Outside 8-50 characters
    /// * `TooWeak` - A required character class is missing
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let password = Self::with_valid_length(password)?;

        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
        let has_special = password
            .chars()
            .any(|c| Self::SPECIAL_CHARACTERS.contains(c));

        if has_digit && has_lower && has_upper && has_special {
            Ok(Self(password))
        } else {
            Err(PasswordPolicyError::TooWeak)
        }
    }

    /// Accept a password presented at login.
    ///
    /// Only the length bounds are checked: accounts must stay reachable even if the
    /// complexity rules tighten later.
    ///
    /// # Errors
    /// * `Blank` - Empty or whitespace only
    /// * `InvalidLength` - Outside 8-50 characters
    pub fn presented(password: String) -> Result<Self, PasswordPolicyError> {
        Self::with_valid_length(password).map(Self)
    }

    fn with_valid_length(password: String) -> Result<String, PasswordPolicyError> {
        if password.trim().is_empty() {
            return Err(PasswordPolicyError::Blank);
        }

        let length = password.chars().count();
        if (Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&length) {
            Ok(password)
        } else {
            Err(PasswordPolicyError::InvalidLength {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            })
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(****)")
    }
}

/// Command to create a new user with domain types
#[derive(Debug)]
pub struct CreateUserCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
}

impl CreateUserCommand {
    pub fn new(username: Username, email: EmailAddress, password: Password) -> Self {
        Self {
            username,
            email,
            password,
        }
    }
}

/// Username and plaintext password presented at login.
#[derive(Debug)]
pub struct Credentials {
    pub username: Username,
    pub password: Password,
}

impl Credentials {
    pub fn new(username: Username, password: Password) -> Self {
        Self { username, password }
    }
}

/// Outcome of a successful login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_ids_sort_by_creation() {
        let first = UserId::new();
        let second = UserId::new();

        assert!(first < second);
        assert_eq!(first.0.get_version_num(), 7);
    }

    #[test]
    fn test_user_id_from_string() {
        let id = UserId::new();
        assert_eq!(UserId::from_string(&id.to_string()), Ok(id));
        assert!(matches!(
            UserId::from_string("not-a-uuid"),
            Err(UserIdError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_username_bounds() {
        assert!(Username::new("abc".to_string()).is_ok());
        assert!(Username::new("a".repeat(50)).is_ok());
        assert_eq!(
            Username::new("ab".to_string()),
            Err(UsernameError::InvalidLength {
                min: 3,
                max: 50,
                actual: 2
            })
        );
        assert!(Username::new("a".repeat(51)).is_err());
        assert_eq!(Username::new("   ".to_string()), Err(UsernameError::Blank));
    }

    #[test]
    fn test_email_validation() {
        assert!(EmailAddress::new("jack12@email.com".to_string()).is_ok());
        assert!(matches!(
            EmailAddress::new("not-an-email".to_string()),
            Err(EmailError::InvalidFormat(_))
        ));
        assert_eq!(EmailAddress::new(String::new()), Err(EmailError::Blank));
    }

    #[test]
    fn test_password_letters_must_be_ascii() {
        for password in ["sécurÉ@1xx", "ÀBCDÉ@1ÿ", "sécurÉ@1ÿ"] {
            assert_eq!(
                Password::new(password.to_string()),
                Err(PasswordPolicyError::TooWeak),
                "{password}"
            );
        }

        assert!(Password::new("SécurÉ@1x".to_string()).is_ok());
    }

    #[test]
    fn test_password_policy() {
        assert!(Password::new("SecureP@ssw0rd".to_string()).is_ok());

        for weak in ["securep@ssw0rd", "SECUREP@SSW0RD", "SecureP@ssword", "SecurePassw0rd"] {
            assert_eq!(
                Password::new(weak.to_string()),
                Err(PasswordPolicyError::TooWeak),
                "{weak}"
            );
        }

        assert!(matches!(
            Password::new("S@1a".to_string()),
            Err(PasswordPolicyError::InvalidLength { .. })
        ));
        assert!(matches!(
            Password::new(format!("S@1a{}", "x".repeat(47))),
            Err(PasswordPolicyError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_presented_password_skips_complexity() {
        assert!(Password::presented("plainpassword".to_string()).is_ok());
        assert!(Password::presented("short".to_string()).is_err());
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let password = Password::new("SecureP@ssw0rd".to_string()).unwrap();
        assert!(!format!("{:?}", password).contains("SecureP@ssw0rd"));

        let user = NewUser {
            username: Username::new("jack12".to_string()).unwrap(),
            email: EmailAddress::new("jack12@email.com".to_string()).unwrap(),
            password_hash: "$argon2id$secret".to_string(),
        }
        .into_user(Utc::now());
        let rendered = format!("{:?}", user);
        assert!(rendered.contains("jack12"));
        assert!(!rendered.contains("$argon2id$secret"));
    }

    #[test]
    fn test_into_user_sets_equal_timestamps() {
        let now = Utc::now();
        let user = NewUser {
            username: Username::new("jack12".to_string()).unwrap(),
            email: EmailAddress::new("jack12@email.com".to_string()).unwrap(),
            password_hash: "hash".to_string(),
        }
        .into_user(now);

        assert_eq!(user.created_at, now);
        assert_eq!(user.updated_at, user.created_at);
    }
}
