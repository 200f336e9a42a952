use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Argon2 work is CPU bound, so hashing and verification are moved onto the
/// blocking thread pool instead of stalling the async workers.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token issuance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    /// Fail with a conflict naming the colliding field, email first.
    ///
    /// One combined lookup covers the common no-conflict case. Only when it reports a
    /// collision are the individual fields checked to build a precise error. If the
    /// colliding record is gone by then, the store's unique constraints decide at
    /// insert time.
    async fn ensure_available(
        &self,
        username: &Username,
        email: &EmailAddress,
    ) -> Result<(), UserError> {
        if !self
            .repository
            .exists_by_username_or_email(username, email)
            .await?
        {
            return Ok(());
        }

        if self.repository.exists_by_email(email).await? {
            return Err(UserError::EmailAlreadyExists(email.to_string()));
        }
        if self.repository.exists_by_username(username).await? {
            return Err(UserError::UsernameAlreadyExists(username.to_string()));
        }

        Ok(())
    }

    async fn hash_password(&self, password: Password) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(UserError::from)
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: CreateUserCommand) -> Result<User, UserError> {
        self.ensure_available(&command.username, &command.email)
            .await
            .inspect_err(|e| tracing::info!(reason = %e, "Registration rejected"))?;

        let password_hash = self.hash_password(command.password).await?;

        let user = self
            .repository
            .create(NewUser {
                username: command.username,
                email: command.email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    async fn authenticate(&self, credentials: Credentials) -> Result<AuthSession, UserError> {
        let Credentials { username, password } = credentials;

        let user = self
            .repository
            .find_by_username(&username)
            .await?
            .ok_or_else(|| {
                tracing::info!(username = %username, reason = "unknown username", "Login rejected");
                UserError::NotFoundByUsername(username.to_string())
            })?;

        let authenticator = Arc::clone(&self.authenticator);
        let stored_hash = user.password_hash.clone();
        let user_id = user.id;
        let subject = user.username.as_str().to_string();

        let issued = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(password.expose(), &stored_hash, user_id, &subject)
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Authentication task failed: {}", e)))?
        .map_err(UserError::from)
        .inspect_err(|e| {
            if matches!(e, UserError::InvalidCredentials) {
                tracing::info!(username = %user.username, reason = "wrong password", "Login rejected");
            }
        })?;

        tracing::info!(user_id = %user.id, "Token issued");

        Ok(AuthSession {
            token: issued.access_token,
            token_type: issued.token_type.to_string(),
            expires_at: issued.expires_at,
            user,
        })
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or(UserError::NotFoundByUsername(username.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use auth::HashingParams;
    use auth::PasswordHasher;
    use auth::TokenService;
    use chrono::Duration;
    use chrono::Utc;
    use mockall::mock;

    use super::*;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: NewUser) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn exists_by_username_or_email(&self, username: &Username, email: &EmailAddress) -> Result<bool, UserError>;
            async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError>;
            async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError>;
        }
    }

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::with_params(HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(
            cheap_hasher(),
            TokenService::new(SECRET, Duration::hours(1)),
        ))
    }

    fn command(username: &str, email: &str) -> CreateUserCommand {
        CreateUserCommand::new(
            Username::new(username.to_string()).unwrap(),
            EmailAddress::new(email.to_string()).unwrap(),
            Password::new("SecureP@ssw0rd".to_string()).unwrap(),
        )
    }

    fn stored_user(username: &str, password: &str) -> User {
        NewUser {
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(format!("{}@email.com", username)).unwrap(),
            password_hash: cheap_hasher().hash(password).unwrap(),
        }
        .into_user(Utc::now())
    }

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials::new(
            Username::new(username.to_string()).unwrap(),
            Password::presented(password.to_string()).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_username_or_email()
            .times(1)
            .returning(|_, _| Ok(false));
        repository.expect_exists_by_email().times(0);
        repository.expect_exists_by_username().times(0);
        repository
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "jack12"
                    && user.email.as_str() == "jack12@email.com"
                    && user.password_hash.starts_with("$argon2id$")
            })
            .times(1)
            .returning(|user| Ok(user.into_user(Utc::now())));

        let service = UserService::new(Arc::new(repository), authenticator());

        let user = service
            .register(command("jack12", "jack12@email.com"))
            .await
            .expect("registration failed");

        assert_eq!(user.username.as_str(), "jack12");
        assert_eq!(user.created_at, user.updated_at);
        assert_ne!(user.password_hash, "SecureP@ssw0rd");
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_username_or_email()
            .returning(|_, _| Ok(true));
        repository.expect_exists_by_email().returning(|_| Ok(false));
        repository.expect_exists_by_username().returning(|_| Ok(true));
        repository.expect_create().times(0);

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.register(command("jack12", "other@email.com")).await;
        assert!(matches!(
            result,
            Err(UserError::UsernameAlreadyExists(ref name)) if name == "jack12"
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_username_or_email()
            .returning(|_, _| Ok(true));
        repository.expect_exists_by_email().returning(|_| Ok(true));
        repository.expect_exists_by_username().times(0);
        repository.expect_create().times(0);

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.register(command("other", "jack12@email.com")).await;
        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_email_conflict_wins_when_both_collide() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_username_or_email()
            .returning(|_, _| Ok(true));
        repository.expect_exists_by_email().times(1).returning(|_| Ok(true));
        repository.expect_exists_by_username().times(0);
        repository.expect_create().times(0);

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.register(command("jack12", "jack12@email.com")).await;
        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_conflict_vanished_defers_to_store() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_username_or_email()
            .returning(|_, _| Ok(true));
        repository.expect_exists_by_email().returning(|_| Ok(false));
        repository.expect_exists_by_username().returning(|_| Ok(false));
        repository
            .expect_create()
            .times(1)
            .returning(|user| Ok(user.into_user(Utc::now())));

        let service = UserService::new(Arc::new(repository), authenticator());

        assert!(service
            .register(command("jack12", "jack12@email.com"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_register_store_constraint_is_final_authority() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_username_or_email()
            .returning(|_, _| Ok(false));
        repository.expect_create().times(1).returning(|user| {
            Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ))
        });

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.register(command("jack12", "jack12@email.com")).await;
        assert!(matches!(result, Err(UserError::UsernameAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_database_failure() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_username_or_email()
            .returning(|_, _| Err(UserError::DatabaseError("connection reset".to_string())));
        repository.expect_create().times(0);

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.register(command("jack12", "jack12@email.com")).await;
        assert!(matches!(result, Err(UserError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("jack12", "SecureP@ssw0rd");
        let user_id = user.id;

        repository
            .expect_find_by_username()
            .withf(|username| username.as_str() == "jack12")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let authenticator = authenticator();
        let service = UserService::new(Arc::new(repository), Arc::clone(&authenticator));

        let session = service
            .authenticate(credentials("jack12", "SecureP@ssw0rd"))
            .await
            .expect("authentication failed");

        assert_eq!(session.token_type, "Bearer");
        assert_eq!(session.user.id, user_id);
        assert!(authenticator.validate_token(&session.token));
        assert_eq!(authenticator.subject_of(&session.token).unwrap(), "jack12");
        assert_eq!(
            authenticator.claims_of(&session.token).unwrap().id,
            user_id.to_string()
        );
    }

    #[tokio::test]
    async fn test_authenticate_unknown_username() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service
            .authenticate(credentials("nobody", "SecureP@ssw0rd"))
            .await;
        assert!(matches!(result, Err(UserError::NotFoundByUsername(_))));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("jack12", "SecureP@ssw0rd");

        repository
            .expect_find_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service
            .authenticate(credentials("jack12", "WrongP@ssw0rd"))
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_corrupt_stored_hash() {
        let mut repository = MockTestUserRepository::new();
        let mut user = stored_user("jack12", "SecureP@ssw0rd");
        user.password_hash = "not-a-hash".to_string();

        repository
            .expect_find_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service
            .authenticate(credentials("jack12", "SecureP@ssw0rd"))
            .await;
        assert!(matches!(result, Err(UserError::Credential(_))));
    }

    #[tokio::test]
    async fn test_get_user_success() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("jack12", "SecureP@ssw0rd");
        let user_id = user.id;

        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(Arc::new(repository), authenticator());

        let found = service.get_user(&user_id).await.unwrap();
        assert_eq!(found.id, user_id);
        assert_eq!(found.username.as_str(), "jack12");
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_user_by_username_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), authenticator());

        let username = Username::new("nonexistent".to_string()).unwrap();
        let result = service.get_user_by_username(&username).await;
        assert!(matches!(result, Err(UserError::NotFoundByUsername(_))));
    }
}
