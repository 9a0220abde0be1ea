//! History domain - the rolling list of analyzed readings and its expiry policy

mod freshness;
mod history_store;

pub use freshness::FreshnessPolicy;
pub use history_store::{load_session, HistoryStore};

use crate::shared::types::Reading;
use serde::{Deserialize, Serialize};

/// Ordered readings, newest first.
///
/// Serializes as the persisted record `{ "data": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    data: Vec<Reading>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from readings already ordered newest first.
    pub fn from_newest_first(data: Vec<Reading>) -> Self {
        Self { data }
    }

    pub fn newest(&self) -> Option<&Reading> {
        self.data.first()
    }

    /// Up to `n` most recent readings, newest first.
    pub fn recent(&self, n: usize) -> &[Reading] {
        &self.data[..n.min(self.data.len())]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn push_newest(&mut self, reading: Reading) {
        self.data.insert(0, reading);
    }

    /// Drop the oldest entries beyond `max`.
    pub(crate) fn truncate(&mut self, max: usize) {
        self.data.truncate(max);
    }
}
