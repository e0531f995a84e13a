//! Lock gate: policy check revoking sessions of locked accounts.
//!
//! Applied only to routes that require authentication, on top of session
//! resolution, never inside it. Optional-auth routes are unaffected.

use tracing::warn;

use tavern_core::error::AppError;
use tavern_core::result::AppResult;
use tavern_entity::session::SessionView;

use super::service::SessionService;

/// Enforce the lock policy on a resolved session.
///
/// If the user carries a lock timestamp, the current session is revoked
/// in the store and the caller receives an explicit `AccountLocked`
/// rejection, distinct from the silent anonymous downgrades. The
/// revocation is best-effort: a store failure is logged but does not
/// turn the rejection into anything else.
pub async fn enforce(service: &SessionService, view: &SessionView) -> AppResult<()> {
    if !view.user.is_locked() {
        return Ok(());
    }

    warn!(user_id = %view.user.id, "Locked account presented a valid session; revoking");
    if let Err(e) = service.revoke(&view.signed_token).await {
        warn!(error = %e, "Failed to revoke session of locked account");
    }

    Err(AppError::account_locked("Account is locked"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tavern_core::error::ErrorKind;

    use crate::testutil::{service_with_user, test_user};

    #[tokio::test]
    async fn locked_account_is_rejected_and_session_deleted() {
        let (service, user) = service_with_user(test_user(true)).await;
        let pending = service.issue(user.id);
        service.persist(&pending).await.unwrap();

        let state = service.resolve(pending.signed_token()).await.unwrap();
        let view = state.session().unwrap().clone();

        let err = enforce(&service, &view).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccountLocked);

        // The forced revocation removed the record: the same token now
        // resolves anonymous.
        let state = service.resolve(pending.signed_token()).await.unwrap();
        assert!(state.session().is_none());
    }

    #[tokio::test]
    async fn unlocked_account_passes() {
        let (service, user) = service_with_user(test_user(false)).await;
        let pending = service.issue(user.id);
        service.persist(&pending).await.unwrap();

        let state = service.resolve(pending.signed_token()).await.unwrap();
        let view = state.session().unwrap().clone();

        assert!(enforce(&service, &view).await.is_ok());
    }
}
