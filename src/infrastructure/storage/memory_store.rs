use std::sync::Mutex;

use crate::domain::history::{History, HistoryStore};
use crate::shared::errors::StoreError;

/// In-process store holding the serialized record, for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an arbitrary persisted payload, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Option<History>, StoreError> {
        match self.raw() {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, history: &History) -> Result<(), StoreError> {
        let json = serde_json::to_string(history)?;
        *self.raw.lock().unwrap_or_else(|e| e.into_inner()) = Some(json);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.raw.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
