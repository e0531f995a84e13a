//! Route guards layered on top of the session middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use tavern_auth::session::gate;
use tavern_core::error::AppError;
use tavern_entity::session::SessionView;

use crate::error::ApiError;
use crate::middleware::session::{append_cookie, clear_session_cookie};
use crate::state::AppState;

/// Reject anonymous requests.
pub async fn require_auth(request: Request, next: Next) -> Response {
    if request.extensions().get::<SessionView>().is_none() {
        return ApiError::from(AppError::authentication("Authentication required"))
            .into_response();
    }
    next.run(request).await
}

/// Reject anonymous requests and enforce the lock gate.
///
/// A locked account gets its session revoked and the cookie cleared;
/// the rejection is an explicit `ACCOUNT_LOCKED`, not a silent
/// anonymous downgrade.
pub async fn require_unlocked(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(view) = request.extensions().get::<SessionView>().cloned() else {
        return ApiError::from(AppError::authentication("Authentication required"))
            .into_response();
    };

    if let Err(e) = gate::enforce(&state.sessions, &view).await {
        let mut response = ApiError::from(e).into_response();
        append_cookie(&mut response, &clear_session_cookie(&state.config.auth));
        return response;
    }

    next.run(request).await
}
