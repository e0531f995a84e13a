//! Session persistence over the shared TTL cache.

use std::sync::Arc;
use std::time::Duration;

use tavern_cache::CacheManager;
use tavern_cache::keys;
use tavern_core::result::AppResult;
use tavern_core::traits::cache::CacheProvider;
use tavern_entity::session::SessionRecord;

/// Stores session records keyed by opaque token.
///
/// The backend enforces the TTL and may evict entries early under
/// pressure; both cases surface as a plain miss. Concurrent puts are
/// last-write-wins, which is fine because records for distinct opaque
/// tokens never collide.
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// The shared cache backend.
    cache: Arc<CacheManager>,
}

impl SessionStore {
    /// Creates a new session store.
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self { cache }
    }

    /// Fetch the record for an opaque token, if present.
    pub async fn get(&self, opaque_token: &str) -> AppResult<Option<SessionRecord>> {
        self.cache
            .get_json::<SessionRecord>(&keys::session(opaque_token))
            .await
    }

    /// Persist a record under an opaque token with the given TTL.
    pub async fn put(
        &self,
        opaque_token: &str,
        record: &SessionRecord,
        ttl: Duration,
    ) -> AppResult<()> {
        self.cache
            .set_json(&keys::session(opaque_token), record, ttl)
            .await
    }

    /// Delete the record for an opaque token. Deleting a missing key succeeds.
    pub async fn delete(&self, opaque_token: &str) -> AppResult<()> {
        self.cache.delete(&keys::session(opaque_token)).await
    }
}
