//! History expiry policy

use super::History;
use chrono::{DateTime, Duration, Utc};

/// How old the newest reading may be before the whole history is discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    window: Duration,
}

impl FreshnessPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// `None` when `hours` does not fit in a chrono duration.
    pub fn hours(hours: i64) -> Option<Self> {
        Duration::try_hours(hours).map(Self::new)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Inclusive: a newest entry exactly `window` old is still fresh.
    /// An empty history is never fresh.
    pub fn is_fresh(&self, history: &History, now: DateTime<Utc>) -> bool {
        match history.newest() {
            Some(newest) => now - newest.timestamp <= self.window,
            None => false,
        }
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(Duration::seconds(24 * 60 * 60))
    }
}
