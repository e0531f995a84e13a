//! `CurrentSession` extractor — the session view attached by the middleware.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;

use tavern_core::error::AppError;
use tavern_entity::session::SessionView;
use tavern_entity::user::User;

use crate::error::ApiError;

/// The authenticated session of the current request.
///
/// Use `CurrentSession` on routes that require authentication (rejects
/// anonymous requests with 401) and `Option<CurrentSession>` on
/// optional-auth routes (anonymous yields `None`).
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionView);

impl CurrentSession {
    /// The resolved user.
    pub fn user(&self) -> &User {
        &self.0.user
    }
}

impl std::ops::Deref for CurrentSession {
    type Target = SessionView;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionView>()
            .cloned()
            .map(CurrentSession)
            .ok_or_else(|| AppError::authentication("Authentication required").into())
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SessionView>()
            .cloned()
            .map(CurrentSession))
    }
}
