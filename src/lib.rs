//! oiwatch - options open-interest trend watcher
//!
//! Polls put/call OI, derives a bullish/bearish signal from successive
//! readings, keeps a rolling history on disk and renders it with a countdown
//! to the next refresh.

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use domain::history::{FreshnessPolicy, History, HistoryStore};
pub use domain::trend::{SessionState, TrendAnalyzer};
pub use infrastructure::market_data::{HttpOiClient, OiSource};
pub use shared::types::{OiSnapshot, Reading, Signal, TradeSignal};
