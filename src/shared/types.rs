//! Common types used across the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw put/call open interest as returned by the data source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OiSnapshot {
    pub put_value: f64,
    pub call_value: f64,
}

impl OiSnapshot {
    pub fn new(put_value: f64, call_value: f64) -> Self {
        Self {
            put_value,
            call_value,
        }
    }
}

/// Directional bias inferred from which side's OI grew faster.
///
/// Serialized as `"Bullish"`, `"Bearish"` or `""` so stored history stays
/// readable by anything that consumed the plain-string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Signal {
    Bullish,
    Bearish,
    #[default]
    #[serde(rename = "")]
    Neutral,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Bullish => "Bullish",
            Signal::Bearish => "Bearish",
            Signal::Neutral => "",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trade recommendation attached to every reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSignal {
    #[serde(rename = "No Trade (Waiting for trend confirmation)")]
    NoTrade,
    #[serde(rename = "Call Buy / Put Sell")]
    CallBuyPutSell,
    #[serde(rename = "Put Buy / Call Sell")]
    PutBuyCallSell,
}

impl TradeSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSignal::NoTrade => "No Trade (Waiting for trend confirmation)",
            TradeSignal::CallBuyPutSell => "Call Buy / Put Sell",
            TradeSignal::PutBuyCallSell => "Put Buy / Call Sell",
        }
    }

    /// True for anything other than the waiting phrase.
    pub fn is_trade(&self) -> bool {
        !matches!(self, TradeSignal::NoTrade)
    }
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analyzed OI observation, the only persisted entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Local wall-clock `HH:MM`, display only
    pub time: String,
    /// Exact instant of the analysis; drives the freshness check
    pub timestamp: DateTime<Utc>,
    pub put: f64,
    pub call: f64,
    pub difference: f64,
    pub difference_change: f64,
    pub put_change: f64,
    pub call_change: f64,
    pub signal: Signal,
    pub weakness: String,
    pub trade_signal: TradeSignal,
}

impl Reading {
    /// JSON has no representation for NaN or infinity; such a reading would
    /// persist as `null` and make the whole history unreadable.
    pub fn is_finite(&self) -> bool {
        [
            self.put,
            self.call,
            self.difference,
            self.difference_change,
            self.put_change,
            self.call_change,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
