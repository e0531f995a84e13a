//! Session lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in hours. The store TTL and the cookie `Max-Age`
    /// both derive from this value.
    #[serde(default = "default_lifetime_hours")]
    pub lifetime_hours: u64,
    /// Remaining-lifetime cutoff in minutes below which a session is
    /// proactively rotated on fetch.
    #[serde(default = "default_renewal_threshold")]
    pub renewal_threshold_minutes: u64,
}

impl SessionConfig {
    /// Session lifetime as a chrono duration.
    pub fn lifetime(&self) -> chrono::Duration {
        chrono::Duration::hours(self.lifetime_hours as i64)
    }

    /// Renewal threshold as a chrono duration.
    pub fn renewal_threshold(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.renewal_threshold_minutes as i64)
    }

    /// Session lifetime as a std duration, for store TTLs.
    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.lifetime_hours * 3600)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_hours: default_lifetime_hours(),
            renewal_threshold_minutes: default_renewal_threshold(),
        }
    }
}

fn default_lifetime_hours() -> u64 {
    168
}

fn default_renewal_threshold() -> u64 {
    60
}
