//! Auth handlers — login, logout, session read.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tracing::info;
use validator::Validate;

use tavern_core::error::AppError;

use crate::dto::request::LoginRequest;
use crate::dto::response::SessionResponse;
use crate::error::ApiError;
use crate::extractors::CurrentSession;
use crate::middleware::session::{
    SessionRevoked, append_cookie, clear_session_cookie, extract_token,
};
use crate::state::AppState;

/// POST /api/v1/auth/login
///
/// Validates credentials and issues a session. The store write does not
/// happen here: the `PendingSession` is registered on the response and
/// executed by the session middleware once the response is final, so a
/// failed or aborted login never leaves a session record behind.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let user = state
        .user_repo
        .find_by_username(&req.username)
        .await?
        .ok_or_else(|| AppError::authentication("Invalid username or password"))?;

    let password_valid = state
        .password_hasher
        .verify_password(&req.password, &user.password_hash)?;
    if !password_valid {
        return Err(AppError::authentication("Invalid username or password").into());
    }

    if user.is_locked() {
        return Err(AppError::account_locked("Account is locked").into());
    }

    let _ = state.user_repo.update_last_login(user.id, Utc::now()).await;
    info!(user_id = %user.id, "Login successful");

    let pending = state.sessions.issue(user.id);
    let view = state.sessions.pending_view(user, &pending);

    let mut response = Json(SessionResponse::from_view(&view)).into_response();
    response.extensions_mut().insert(pending);
    Ok(response)
}

/// POST /api/v1/auth/logout
///
/// Revokes the presented session, if any, and clears the cookie.
/// Idempotent: absent or invalid tokens are a no-op success.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(token) = extract_token(&headers, &state.config.auth.cookie_name) {
        state.sessions.revoke(&token).await?;
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    response.extensions_mut().insert(SessionRevoked);
    append_cookie(&mut response, &clear_session_cookie(&state.config.auth));
    Ok(response)
}

/// GET /api/v1/auth/session
///
/// The session resource for the current request. Requires an unlocked,
/// authenticated session (enforced by the route guards).
pub async fn session(CurrentSession(view): CurrentSession) -> Json<SessionResponse> {
    Json(SessionResponse::from_view(&view))
}
