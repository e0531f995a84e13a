//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use tavern_auth::identity::{IdentityResolver, PgIdentityResolver};
use tavern_auth::password::PasswordHasher;
use tavern_auth::session::service::SessionService;
use tavern_auth::session::store::SessionStore;
use tavern_auth::token::codec::TokenCodec;
use tavern_cache::CacheManager;
use tavern_core::config::AppConfig;
use tavern_database::repositories::user::UserRepository;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Cache manager (Redis or in-memory); home of the session store.
    pub cache: Arc<CacheManager>,
    /// Session lifecycle service.
    pub sessions: Arc<SessionService>,
    /// Password hasher (Argon2id).
    pub password_hasher: Arc<PasswordHasher>,
    /// User repository.
    pub user_repo: Arc<UserRepository>,
}

impl AppState {
    /// Wire the full application state from its infrastructure pieces.
    pub fn new(config: AppConfig, db_pool: PgPool, cache: Arc<CacheManager>) -> Self {
        let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
        let resolver = Arc::new(PgIdentityResolver::new(user_repo.clone()));
        Self::with_resolver(config, db_pool, cache, user_repo, resolver)
    }

    /// Wire the state with an explicit identity resolver (for testing).
    pub fn with_resolver(
        config: AppConfig,
        db_pool: PgPool,
        cache: Arc<CacheManager>,
        user_repo: Arc<UserRepository>,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Self {
        let sessions = Arc::new(SessionService::new(
            TokenCodec::from_config(&config.auth),
            SessionStore::new(cache.clone()),
            resolver,
            config.session.clone(),
        ));

        Self {
            config: Arc::new(config),
            db_pool,
            cache,
            sessions,
            password_hasher: Arc::new(PasswordHasher::new()),
            user_repo,
        }
    }
}
