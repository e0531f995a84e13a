//! Identity resolution: from a session's user reference to a full user.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use tavern_core::result::AppResult;
use tavern_database::repositories::user::UserRepository;
use tavern_entity::user::User;

/// Loads a user and its authorization attributes in one logical fetch.
///
/// `Ok(None)` means the user no longer exists (deleted after the session
/// was issued); callers downgrade the session to anonymous. An `Err` is
/// an infrastructure failure and propagates.
#[async_trait]
pub trait IdentityResolver: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve a user reference to the full user, or `None` if unknown.
    async fn resolve(&self, user_id: Uuid) -> AppResult<Option<User>>;
}

/// Database-backed identity resolver.
#[derive(Debug, Clone)]
pub struct PgIdentityResolver {
    repo: Arc<UserRepository>,
}

impl PgIdentityResolver {
    /// Create a resolver over the user repository.
    pub fn new(repo: Arc<UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl IdentityResolver for PgIdentityResolver {
    async fn resolve(&self, user_id: Uuid) -> AppResult<Option<User>> {
        self.repo.find_by_id(user_id).await
    }
}
