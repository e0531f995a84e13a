//! Token signing and credential configuration.

use serde::{Deserialize, Serialize};

/// Authentication configuration.
///
/// `secret` and `token_salt` together derive the session token signing key.
/// The secret is process-wide; the salt is specific to the session token
/// codec so the same secret can serve other signed values without their
/// signatures being interchangeable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Process-wide signing secret.
    #[serde(default = "default_secret")]
    pub secret: String,
    /// Salt scoping the signing key to the session token codec.
    #[serde(default = "default_token_salt")]
    pub token_salt: String,
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Whether the session cookie is marked `Secure`.
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            token_salt: default_token_salt(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
        }
    }
}

fn default_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_token_salt() -> String {
    "session-token".to_string()
}

fn default_cookie_name() -> String {
    "session".to_string()
}
