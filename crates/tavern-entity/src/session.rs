//! Session record and per-request session view.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::User;

/// The session state persisted in the store, keyed by the opaque token.
///
/// `expires_at` is fixed at creation; the store's TTL is the enforcement
/// mechanism, the timestamp here is the authoritative remaining-lifetime
/// source for renewal decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// When this session expires.
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a record expiring `lifetime` from now.
    pub fn new(user_id: Uuid, lifetime: Duration) -> Self {
        Self {
            user_id,
            expires_at: Utc::now() + lifetime,
        }
    }

    /// Whether the record has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// The ephemeral, per-request projection of an authenticated session.
///
/// Derived on every fetch, never persisted. `signed_token` is the wire
/// token the request authenticated with (or the replacement token when a
/// renewal happened during the fetch).
#[derive(Debug, Clone)]
pub struct SessionView {
    /// The resolved user, including authorization attributes.
    pub user: User,
    /// The signed wire token for this session.
    pub signed_token: String,
    /// When the backing record expires.
    pub expires_at: DateTime<Utc>,
}

impl SessionView {
    /// Remaining lifetime at observation time. Negative once expired.
    pub fn expires_in(&self) -> Duration {
        self.expires_at - Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trips_through_json() {
        let record = SessionRecord::new(Uuid::new_v4(), Duration::hours(168));
        let json = serde_json::to_string(&record).unwrap();
        let parsed: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn expiry_is_based_on_timestamp() {
        let mut record = SessionRecord::new(Uuid::new_v4(), Duration::hours(1));
        assert!(!record.is_expired());
        record.expires_at = Utc::now() - Duration::seconds(1);
        assert!(record.is_expired());
    }
}
