//! Shared fixtures for the in-crate tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use tavern_cache::CacheManager;
use tavern_cache::memory::MemoryCacheProvider;
use tavern_core::config::cache::MemoryCacheConfig;
use tavern_core::config::session::SessionConfig;
use tavern_core::error::AppError;
use tavern_core::result::AppResult;
use tavern_core::traits::cache::CacheProvider;
use tavern_entity::user::User;

use crate::identity::IdentityResolver;
use crate::session::service::SessionService;
use crate::session::store::SessionStore;
use crate::token::codec::TokenCodec;

/// Resolver backed by a fixed set of users.
#[derive(Debug, Default)]
pub(crate) struct StubResolver {
    users: Vec<User>,
}

impl StubResolver {
    pub(crate) fn with_user(user: User) -> Self {
        Self { users: vec![user] }
    }
}

#[async_trait]
impl IdentityResolver for StubResolver {
    async fn resolve(&self, user_id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.iter().find(|u| u.id == user_id).cloned())
    }
}

/// Cache provider whose every operation fails, for outage tests.
#[derive(Debug)]
pub(crate) struct FailingCacheProvider;

#[async_trait]
impl CacheProvider for FailingCacheProvider {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::cache("cache is down"))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: std::time::Duration) -> AppResult<()> {
        Err(AppError::cache("cache is down"))
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Err(AppError::cache("cache is down"))
    }

    async fn exists(&self, _key: &str) -> AppResult<bool> {
        Err(AppError::cache("cache is down"))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }
}

pub(crate) fn test_user(locked: bool) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        username: "innkeeper".to_string(),
        email: Some("innkeeper@tavern.test".to_string()),
        password_hash: "$argon2id$stub".to_string(),
        display_name: Some("The Innkeeper".to_string()),
        is_admin: false,
        locked_at: locked.then_some(now),
        created_at: now,
        updated_at: now,
        last_login_at: None,
    }
}

fn build_service(cache: Arc<dyn CacheProvider>, user: User) -> SessionService {
    let manager = Arc::new(CacheManager::from_provider(cache));
    SessionService::new(
        TokenCodec::new("test-secret", "session-token"),
        SessionStore::new(manager),
        Arc::new(StubResolver::with_user(user)),
        SessionConfig::default(),
    )
}

/// Service over an in-memory cache knowing the given user.
pub(crate) async fn service_with_user(user: User) -> (SessionService, User) {
    let provider = MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 });
    let service = build_service(Arc::new(provider), user.clone());
    (service, user)
}

/// Service over a cache whose operations all fail.
pub(crate) fn failing_service(user: User) -> (SessionService, User) {
    let service = build_service(Arc::new(FailingCacheProvider), user.clone());
    (service, user)
}
