use async_trait::async_trait;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered (checked first)
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `Credential` - Password hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Verify credentials and issue an identity token.
    ///
    /// # Errors
    /// * `NotFoundByUsername` - No user with this username
    /// * `InvalidCredentials` - Password does not match
    /// * `Credential` - Stored hash unusable or token signing failed
    /// * `DatabaseError` - Database operation failed
    async fn authenticate(&self, credentials: Credentials) -> Result<AuthSession, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve user by unique username.
    ///
    /// # Errors
    /// * `NotFoundByUsername` - No user with this username
    /// * `DatabaseError` - Database operation failed
    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError>;
}

/// Persistence operations for user aggregate.
///
/// Implementations must enforce username and email uniqueness at write time; the
/// existence checks are only a fast path for a friendlier error.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user, assigning its identifier and timestamps.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Whether any user holds this username or this email, in one lookup.
    async fn exists_by_username_or_email(
        &self,
        username: &Username,
        email: &EmailAddress,
    ) -> Result<bool, UserError>;

    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError>;

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError>;
}
