//! Session middleware: credential extraction, renewal, deferred persistence.
//!
//! Runs around every request. On the way in it resolves the presented
//! credential and attaches the [`SessionView`] to the request extensions;
//! on the way out it executes the deferred store write for any session
//! issued during the request (login or renewal) and emits the
//! `Set-Cookie`. Because the write happens after `next.run`, an aborted
//! request drops this future before the write and no orphaned record is
//! ever created; an error response skips the write for the same reason.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, error};

use tavern_auth::session::service::{AuthState, PendingSession};
use tavern_core::config::auth::AuthConfig;
use tavern_core::error::AppError;
use tavern_entity::session::SessionView;

use crate::error::ApiError;
use crate::state::AppState;

/// Marker a handler attaches to its response after revoking the current
/// session. Any renewal decided earlier in the request is discarded, so
/// a logout on a near-expiry token cannot resurrect the session.
#[derive(Debug, Clone, Copy)]
pub struct SessionRevoked;

/// Extract the signed token from a request.
///
/// `Authorization: Bearer` wins over the session cookie; the cookie is
/// only consulted when no usable bearer value is present.
pub(crate) fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
}

/// Build the `Set-Cookie` value carrying a freshly issued session token.
fn session_cookie(auth: &AuthConfig, signed_token: &str, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build((auth.cookie_name.clone(), signed_token.to_string()))
        .http_only(true)
        .secure(auth.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(max_age_seconds))
        .build()
}

/// Build the removal cookie clearing the session.
pub(crate) fn clear_session_cookie(auth: &AuthConfig) -> Cookie<'static> {
    Cookie::build((auth.cookie_name.clone(), ""))
        .http_only(true)
        .secure(auth.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

/// Append a `Set-Cookie` header to a response, logging if the value is
/// not header-safe (signed tokens always are).
pub(crate) fn append_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => error!(error = %e, "Failed to encode session cookie"),
    }
}

/// The per-request session pipeline.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_token(request.headers(), &state.config.auth.cookie_name);

    // Resolve the credential and decide on renewal before the handler runs.
    let mut rotation: Option<PendingSession> = None;
    if let Some(token) = token {
        match state.sessions.resolve(&token).await {
            Ok(AuthState::Authenticated(view)) => {
                let view = match state.sessions.rotate_if_due(&view) {
                    Some(pending) => {
                        let view = state.sessions.pending_view(view.user, &pending);
                        rotation = Some(pending);
                        view
                    }
                    None => view,
                };
                request.extensions_mut().insert::<SessionView>(view);
            }
            Ok(AuthState::Anonymous) => {}
            Err(e) => return ApiError::from(e).into_response(),
        }
    }

    let mut response = next.run(request).await;

    // Collect deferred writes: a renewal decided above, and any session
    // the handler issued (login registers its PendingSession on the
    // response). A non-success response means the request failed, and a
    // failed request must never leave a session record behind.
    if response.extensions_mut().remove::<SessionRevoked>().is_some() {
        rotation = None;
    }
    let created = response.extensions_mut().remove::<PendingSession>();
    let pending: Vec<PendingSession> = rotation.into_iter().chain(created).collect();

    if pending.is_empty() {
        return response;
    }

    if !response.status().is_success() {
        debug!(status = %response.status(), "Skipping session persistence for failed request");
        return response;
    }

    let max_age = state.config.session.ttl().as_secs() as i64;
    for session in &pending {
        if let Err(e) = state.sessions.persist(session).await {
            error!(error = %e, user_id = %session.user_id(), "Deferred session write failed");
            return ApiError::from(AppError::service_unavailable(
                "Session could not be persisted",
            ))
            .into_response();
        }
        let cookie = session_cookie(&state.config.auth, session.signed_token(), max_age);
        append_cookie(&mut response, &cookie);
    }

    response
}
