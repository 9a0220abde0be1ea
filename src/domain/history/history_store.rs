//! History persistence interface and startup reload

use super::{FreshnessPolicy, History};
use crate::domain::trend::SessionState;
use crate::shared::errors::StoreError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Key-value persistence of the history record
pub trait HistoryStore: Send + Sync {
    /// `Ok(None)` when nothing has been persisted yet.
    fn load(&self) -> Result<Option<History>, StoreError>;

    /// Overwrite the persisted record with the full history.
    fn save(&self, history: &History) -> Result<(), StoreError>;

    /// Remove the persisted record. Clearing an absent record is not an error.
    fn clear(&self) -> Result<(), StoreError>;

    /// Get an unreadable record out of the way of the next save.
    fn quarantine(&self) -> Result<(), StoreError> {
        self.clear()
    }
}

impl<T: HistoryStore + ?Sized> HistoryStore for Arc<T> {
    fn load(&self) -> Result<Option<History>, StoreError> {
        (**self).load()
    }

    fn save(&self, history: &History) -> Result<(), StoreError> {
        (**self).save(history)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }

    fn quarantine(&self) -> Result<(), StoreError> {
        (**self).quarantine()
    }
}

/// Rebuild the session from persisted history.
///
/// Fresh history is adopted and seeds the previous-value caches. Stale history
/// is removed from the store entirely. Unreadable history counts as absent and
/// is quarantined so the first save of the new session cannot overwrite it.
pub fn load_session(
    store: &dyn HistoryStore,
    policy: &FreshnessPolicy,
    now: DateTime<Utc>,
) -> SessionState {
    let history = match store.load() {
        Ok(Some(history)) => history,
        Ok(None) => {
            info!("No stored history, starting fresh");
            return SessionState::new();
        }
        Err(StoreError::Malformed(e)) => {
            warn!("⚠️ Ignoring unreadable history: {}", e);
            if let Err(e) = store.quarantine() {
                warn!("⚠️ Failed to set aside unreadable history: {}", e);
            }
            return SessionState::new();
        }
        Err(e) => {
            warn!("⚠️ Ignoring unreadable history: {}", e);
            return SessionState::new();
        }
    };

    if history.is_empty() {
        return SessionState::new();
    }

    if policy.is_fresh(&history, now) {
        info!("✅ Restored {} readings from history", history.len());
        SessionState::from_history(history)
    } else {
        info!(
            "History older than {}h, discarding",
            policy.window().num_hours()
        );
        if let Err(e) = store.clear() {
            warn!("⚠️ Failed to remove stale history: {}", e);
        }
        SessionState::new()
    }
}
