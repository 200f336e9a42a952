use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Read-through cache for lookups by id in front of another repository.
///
/// Only hits are cached. Existence checks and username lookups always reach the
/// backing store, since a cached "absent" must never decide uniqueness.
pub struct CachedUserRepository<UR>
where
    UR: UserRepository,
{
    inner: UR,
    by_id: DashMap<UserId, User>,
    max_entries: usize,
}

impl<UR> CachedUserRepository<UR>
where
    UR: UserRepository,
{
    /// # Arguments
    /// * `inner` - Backing repository, the source of truth
    /// * `max_entries` - Lookups beyond this many cached users go uncached
    pub fn new(inner: UR, max_entries: usize) -> Self {
        Self {
            inner,
            by_id: DashMap::new(),
            max_entries,
        }
    }

    /// Drop the cached copy of a user.
    pub fn evict(&self, id: &UserId) {
        self.by_id.remove(id);
    }

    pub fn cached_len(&self) -> usize {
        self.by_id.len()
    }
}

#[async_trait]
impl<UR> UserRepository for CachedUserRepository<UR>
where
    UR: UserRepository,
{
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let created = self.inner.create(user).await?;
        self.evict(&created.id);
        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        if let Some(user) = self.by_id.get(id) {
            tracing::trace!(user_id = %id, "User cache hit");
            return Ok(Some(user.clone()));
        }

        let found = self.inner.find_by_id(id).await?;
        if let Some(user) = &found {
            if self.by_id.len() < self.max_entries {
                self.by_id.insert(user.id, user.clone());
            }
        }

        Ok(found)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        self.inner.find_by_username(username).await
    }

    async fn exists_by_username_or_email(
        &self,
        username: &Username,
        email: &EmailAddress,
    ) -> Result<bool, UserError> {
        self.inner.exists_by_username_or_email(username, email).await
    }

    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError> {
        self.inner.exists_by_username(username).await
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError> {
        self.inner.exists_by_email(email).await
    }
}
