//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user in the Tavern system.
///
/// Authorization attributes (`is_admin`, `locked_at`) are loaded together
/// with the profile in one fetch so a resolved user is always complete
/// enough for policy checks.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Whether the user has administrative privileges.
    pub is_admin: bool,
    /// When the account was locked, if it is.
    pub locked_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if the user account is currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(locked_at: Option<DateTime<Utc>>) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "innkeeper".to_string(),
            email: None,
            password_hash: "$argon2id$stub".to_string(),
            display_name: None,
            is_admin: false,
            locked_at,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    #[test]
    fn lock_follows_timestamp() {
        assert!(!make_user(None).is_locked());
        assert!(make_user(Some(Utc::now())).is_locked());
    }

    #[test]
    fn password_hash_never_serialized() {
        let json = serde_json::to_string(&make_user(None)).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
    }
}
