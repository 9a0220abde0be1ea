//! Trend domain - put/call delta analysis and the session it mutates

mod session;
mod trend_analyzer;

pub use session::SessionState;
pub use trend_analyzer::{
    describe_weakness, detect_signal, is_trend_confirmed, recommend_trade, TrendAnalyzer,
};

/// Number of immediately-prior readings that must share the new signal.
pub const CONFIRMATION_LOOKBACK: usize = 2;
