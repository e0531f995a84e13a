//! Request DTOs.

use serde::Deserialize;
use validator::Validate;

/// Login request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login name.
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    /// Plaintext password.
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}
