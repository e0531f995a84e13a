//! Response DTOs.

use serde::{Deserialize, Serialize};

use tavern_entity::session::SessionView;
use tavern_entity::user::User;

/// The session resource returned on login and session read.
///
/// `expires_in` is the remaining lifetime in milliseconds at the moment
/// the view was observed.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    /// The authenticated user.
    pub user: User,
    /// The signed session token.
    pub access_token: String,
    /// Always `"Bearer"`.
    pub token_type: &'static str,
    /// Remaining lifetime in milliseconds.
    pub expires_in: i64,
}

impl SessionResponse {
    /// Project a session view into the wire shape.
    pub fn from_view(view: &SessionView) -> Self {
        Self {
            user: view.user.clone(),
            access_token: view.signed_token.clone(),
            token_type: "Bearer",
            expires_in: view.expires_in().num_milliseconds().max(0),
        }
    }
}

/// Health probe response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status string.
    pub status: String,
    /// Whether the cache backend is reachable.
    pub cache: bool,
}
