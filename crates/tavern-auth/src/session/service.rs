//! Session lifecycle service — resolve, issue, rotate, revoke.
//!
//! The read path (`resolve`) and the rotation decision (`rotate_if_due`)
//! are separate so each is independently testable; the request pipeline
//! invokes them in sequence. Writes for newly issued sessions are
//! represented as a [`PendingSession`] and executed by the pipeline only
//! once the response is final, so an aborted request never leaves an
//! orphaned record.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use tavern_core::config::session::SessionConfig;
use tavern_core::result::AppResult;
use tavern_entity::session::{SessionRecord, SessionView};
use tavern_entity::user::User;

use crate::identity::IdentityResolver;
use crate::token::codec::{TokenCodec, generate_opaque_token};

use super::store::SessionStore;

/// Authentication state of a request after session resolution.
///
/// Credential problems (missing, malformed, mismatched signature,
/// expired or evicted record, vanished user) all collapse into
/// `Anonymous`; they are never errors. Only the lock gate produces an
/// explicit rejection, and it does so via `AppError`, not here.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// No usable credential was presented.
    Anonymous,
    /// A valid session was resolved.
    Authenticated(SessionView),
}

impl AuthState {
    /// The session view, if authenticated.
    pub fn session(&self) -> Option<&SessionView> {
        match self {
            Self::Authenticated(view) => Some(view),
            Self::Anonymous => None,
        }
    }
}

/// A freshly issued session that has not been persisted yet.
///
/// Created by [`SessionService::issue`]; the signed token may be handed
/// to the client immediately, but the store write happens later via
/// [`SessionService::persist`]. Dropping a `PendingSession` without
/// persisting writes nothing.
#[derive(Clone)]
pub struct PendingSession {
    opaque_token: String,
    signed_token: String,
    user_id: Uuid,
}

impl std::fmt::Debug for PendingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSession")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl PendingSession {
    /// The signed wire token for the new session.
    pub fn signed_token(&self) -> &str {
        &self.signed_token
    }

    /// The user the new session belongs to.
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

/// Orchestrates codec, store, and resolver for the session lifecycle.
#[derive(Debug, Clone)]
pub struct SessionService {
    /// Signed-token codec.
    codec: TokenCodec,
    /// Session persistence.
    store: SessionStore,
    /// Identity resolution.
    resolver: Arc<dyn IdentityResolver>,
    /// Session lifecycle configuration.
    config: SessionConfig,
}

impl SessionService {
    /// Creates a new session service.
    pub fn new(
        codec: TokenCodec,
        store: SessionStore,
        resolver: Arc<dyn IdentityResolver>,
        config: SessionConfig,
    ) -> Self {
        Self {
            codec,
            store,
            resolver,
            config,
        }
    }

    /// The session lifecycle configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Resolve a signed token to an authentication state. Pure read.
    ///
    /// Store failures are logged and treated as a miss (fail-open), so a
    /// cache outage degrades optional-auth routes to anonymous instead
    /// of erroring. Resolver failures propagate; a database outage is
    /// not a reason to silently log anyone out.
    pub async fn resolve(&self, signed_token: &str) -> AppResult<AuthState> {
        let Some(opaque) = self.codec.verify(signed_token) else {
            return Ok(AuthState::Anonymous);
        };

        let record = match self.store.get(&opaque).await {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(AuthState::Anonymous),
            Err(e) => {
                warn!(error = %e, "Session store read failed; treating as miss");
                return Ok(AuthState::Anonymous);
            }
        };

        if record.is_expired() {
            return Ok(AuthState::Anonymous);
        }

        let Some(user) = self.resolver.resolve(record.user_id).await? else {
            debug!(user_id = %record.user_id, "Session references a vanished user");
            return Ok(AuthState::Anonymous);
        };

        Ok(AuthState::Authenticated(SessionView {
            user,
            signed_token: signed_token.to_string(),
            expires_at: record.expires_at,
        }))
    }

    /// Issue a new session for a user. Nothing is persisted yet.
    pub fn issue(&self, user_id: Uuid) -> PendingSession {
        let opaque_token = generate_opaque_token();
        let signed_token = self.codec.sign(&opaque_token);
        PendingSession {
            opaque_token,
            signed_token,
            user_id,
        }
    }

    /// Decide whether a resolved session is due for rotation.
    ///
    /// Returns a replacement pending session when the remaining lifetime
    /// has dropped below the renewal threshold. The old record is left
    /// untouched and remains valid until its own expiry.
    pub fn rotate_if_due(&self, view: &SessionView) -> Option<PendingSession> {
        if view.expires_in() < self.config.renewal_threshold() {
            debug!(user_id = %view.user.id, "Session below renewal threshold; rotating");
            Some(self.issue(view.user.id))
        } else {
            None
        }
    }

    /// Execute the deferred store write for a pending session.
    ///
    /// Computes `expires_at` at execution time and writes the record with
    /// the full session lifetime as TTL. A failure here propagates: a
    /// session that was not durably persisted must not be reported as
    /// created.
    pub async fn persist(&self, pending: &PendingSession) -> AppResult<SessionRecord> {
        let record = SessionRecord::new(pending.user_id, self.config.lifetime());
        self.store
            .put(&pending.opaque_token, &record, self.config.ttl())
            .await?;
        debug!(user_id = %pending.user_id, expires_at = %record.expires_at, "Session persisted");
        Ok(record)
    }

    /// Revoke the session behind a signed token. Idempotent.
    ///
    /// Invalid or unknown tokens are a no-op success; revoking is about
    /// the end state, not about whether a session existed.
    pub async fn revoke(&self, signed_token: &str) -> AppResult<()> {
        if let Some(opaque) = self.codec.verify(signed_token) {
            self.store.delete(&opaque).await?;
        }
        Ok(())
    }

    /// Build the per-request view for a freshly issued session.
    ///
    /// The record does not exist yet, so `expires_at` is projected from
    /// now; the persisted value is computed when the deferred write runs.
    pub fn pending_view(&self, user: User, pending: &PendingSession) -> SessionView {
        SessionView {
            user,
            signed_token: pending.signed_token.clone(),
            expires_at: Utc::now() + self.config.lifetime(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::testutil::{failing_service, service_with_user, test_user};

    #[tokio::test]
    async fn round_trip_create_then_resolve() {
        let (service, user) = service_with_user(test_user(false)).await;

        let pending = service.issue(user.id);
        service.persist(&pending).await.unwrap();

        let state = service.resolve(pending.signed_token()).await.unwrap();
        let view = state.session().expect("should authenticate");
        assert_eq!(view.user.id, user.id);
        assert!(view.expires_in() > Duration::zero());
    }

    #[tokio::test]
    async fn unpersisted_pending_session_resolves_anonymous() {
        let (service, user) = service_with_user(test_user(false)).await;

        // Simulates a request aborted before response finalization: the
        // deferred write never ran.
        let pending = service.issue(user.id);

        let state = service.resolve(pending.signed_token()).await.unwrap();
        assert!(state.session().is_none());
    }

    #[tokio::test]
    async fn tampered_token_resolves_anonymous() {
        let (service, user) = service_with_user(test_user(false)).await;
        let pending = service.issue(user.id);
        service.persist(&pending).await.unwrap();

        let mut tampered = pending.signed_token().as_bytes().to_vec();
        tampered[3] ^= 0x01;
        let tampered = String::from_utf8(tampered).unwrap();

        let state = service.resolve(&tampered).await.unwrap();
        assert!(state.session().is_none());
    }

    #[tokio::test]
    async fn expired_record_resolves_anonymous() {
        let (service, user) = service_with_user(test_user(false)).await;
        let pending = service.issue(user.id);

        // Write a record whose expiry is already in the past, directly
        // through the store, bypassing the TTL.
        let record = SessionRecord {
            user_id: user.id,
            expires_at: Utc::now() - Duration::minutes(1),
        };
        service
            .store
            .put(
                &pending.opaque_token,
                &record,
                std::time::Duration::from_secs(60),
            )
            .await
            .unwrap();

        let state = service.resolve(pending.signed_token()).await.unwrap();
        assert!(state.session().is_none());
    }

    #[tokio::test]
    async fn vanished_user_resolves_anonymous() {
        let (service, _user) = service_with_user(test_user(false)).await;

        let stranger = Uuid::new_v4();
        let pending = service.issue(stranger);
        service.persist(&pending).await.unwrap();

        let state = service.resolve(pending.signed_token()).await.unwrap();
        assert!(state.session().is_none());
    }

    #[tokio::test]
    async fn rotation_fires_below_threshold_only() {
        let (service, user) = service_with_user(test_user(false)).await;
        let pending = service.issue(user.id);
        service.persist(&pending).await.unwrap();

        let state = service.resolve(pending.signed_token()).await.unwrap();
        let mut view = state.session().unwrap().clone();

        // 2 hours remaining: no rotation.
        view.expires_at = Utc::now() + Duration::hours(2);
        assert!(service.rotate_if_due(&view).is_none());

        // 59 minutes remaining: rotate.
        view.expires_at = Utc::now() + Duration::minutes(59);
        let rotated = service.rotate_if_due(&view).expect("should rotate");
        assert_ne!(rotated.signed_token(), pending.signed_token());
        assert_eq!(rotated.user_id(), user.id);

        // The replacement gets a full fresh lifetime.
        let record = service.persist(&rotated).await.unwrap();
        assert!(record.expires_at > Utc::now() + Duration::hours(167));
    }

    #[tokio::test]
    async fn rotation_leaves_old_token_valid() {
        // Pins the observed behavior: renewal does not invalidate the
        // prior token; both stay valid until their own natural expiry.
        let (service, user) = service_with_user(test_user(false)).await;
        let old = service.issue(user.id);
        service.persist(&old).await.unwrap();

        let state = service.resolve(old.signed_token()).await.unwrap();
        let mut view = state.session().unwrap().clone();
        view.expires_at = Utc::now() + Duration::minutes(30);

        let new = service.rotate_if_due(&view).expect("should rotate");
        service.persist(&new).await.unwrap();

        let old_state = service.resolve(old.signed_token()).await.unwrap();
        let new_state = service.resolve(new.signed_token()).await.unwrap();
        assert!(old_state.session().is_some());
        assert!(new_state.session().is_some());
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let (service, user) = service_with_user(test_user(false)).await;
        let pending = service.issue(user.id);
        service.persist(&pending).await.unwrap();

        service.revoke(pending.signed_token()).await.unwrap();
        let state = service.resolve(pending.signed_token()).await.unwrap();
        assert!(state.session().is_none());

        // Second revoke of the same token, and revoking garbage, both succeed.
        service.revoke(pending.signed_token()).await.unwrap();
        service.revoke("not-even-a-token").await.unwrap();
    }

    #[tokio::test]
    async fn store_read_failure_fails_open() {
        let (service, user) = failing_service(test_user(false));
        let pending = service.issue(user.id);

        let state = service.resolve(pending.signed_token()).await.unwrap();
        assert!(state.session().is_none());
    }

    #[tokio::test]
    async fn store_write_failure_fails_closed() {
        let (service, user) = failing_service(test_user(false));
        let pending = service.issue(user.id);

        assert!(service.persist(&pending).await.is_err());
    }
}
