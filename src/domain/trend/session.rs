//! Session state carried between ticks

use crate::domain::history::History;
use crate::shared::types::Reading;

/// Mutable state threaded through the analyzer.
///
/// `previous_*` are caches of the newest history entry. Every mutation goes
/// through [`SessionState::record`] or [`SessionState::from_history`] so the
/// two never disagree.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    previous_put: Option<f64>,
    previous_call: Option<f64>,
    previous_difference: Option<f64>,
    trend_confirmed: bool,
    history: History,
    max_entries: Option<usize>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a history and seed the caches from its newest entry.
    pub fn from_history(history: History) -> Self {
        let mut state = Self::default();
        if let Some(newest) = history.newest() {
            state.previous_put = Some(newest.put);
            state.previous_call = Some(newest.call);
            state.previous_difference = Some(newest.difference);
        }
        state.history = history;
        state
    }

    /// Cap the history length. `None` keeps it unbounded.
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        if let Some(max) = max_entries {
            self.history.truncate(max);
        }
        self
    }

    pub fn previous_put(&self) -> Option<f64> {
        self.previous_put
    }

    pub fn previous_call(&self) -> Option<f64> {
        self.previous_call
    }

    pub fn previous_difference(&self) -> Option<f64> {
        self.previous_difference
    }

    pub fn trend_confirmed(&self) -> bool {
        self.trend_confirmed
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Prepend a freshly analyzed reading and move the caches forward to it.
    pub fn record(&mut self, reading: Reading) {
        self.previous_put = Some(reading.put);
        self.previous_call = Some(reading.call);
        self.previous_difference = Some(reading.difference);
        self.trend_confirmed = reading.trade_signal.is_trade();

        self.history.push_newest(reading);
        if let Some(max) = self.max_entries {
            self.history.truncate(max);
        }
    }
}
