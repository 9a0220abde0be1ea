//! Put/call open-interest trend analysis

use super::{SessionState, CONFIRMATION_LOOKBACK};
use crate::domain::history::History;
use crate::shared::types::{OiSnapshot, Reading, Signal, TradeSignal};
use crate::shared::utils::format_number;
use chrono::{DateTime, Local, Utc};

/// Turns a raw snapshot into an analyzed reading
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze `snapshot` against the session without mutating it.
    ///
    /// The caller records the returned reading into the session and persists.
    pub fn analyze(
        &self,
        snapshot: OiSnapshot,
        state: &SessionState,
        at: DateTime<Local>,
    ) -> Reading {
        let put = snapshot.put_value;
        let call = snapshot.call_value;

        let put_change = state.previous_put().map_or(0.0, |prev| put - prev);
        let call_change = state.previous_call().map_or(0.0, |prev| call - prev);

        let difference = put - call;
        let difference_change = state
            .previous_difference()
            .map_or(0.0, |prev| difference - prev);

        let signal = detect_signal(put_change, call_change);
        let weakness = describe_weakness(signal, put_change, call_change);
        let confirmed = is_trend_confirmed(state.history(), signal);

        Reading {
            time: at.format("%H:%M").to_string(),
            timestamp: at.with_timezone(&Utc),
            put,
            call,
            difference,
            difference_change,
            put_change,
            call_change,
            signal,
            weakness,
            trade_signal: recommend_trade(confirmed, signal),
        }
    }
}

/// Compare changes, not levels.
pub fn detect_signal(put_change: f64, call_change: f64) -> Signal {
    if call_change > put_change {
        Signal::Bearish
    } else if put_change > call_change {
        Signal::Bullish
    } else {
        Signal::Neutral
    }
}

/// Explanatory text only; nothing downstream reads it.
pub fn describe_weakness(signal: Signal, put_change: f64, call_change: f64) -> String {
    match signal {
        Signal::Bearish if put_change < 0.0 => {
            format!("Put is weaker by {}", format_number(put_change.abs()))
        }
        Signal::Bearish => format!("Call increased by {}", format_number(call_change)),
        Signal::Bullish if call_change < 0.0 => {
            format!("Call is weaker by {}", format_number(call_change.abs()))
        }
        Signal::Bullish => format!("Put increased by {}", format_number(put_change)),
        Signal::Neutral => String::new(),
    }
}

/// True when the two readings immediately before this one carry `signal`.
///
/// This is a fixed lookback over `prior`, not a streak length.
pub fn is_trend_confirmed(prior: &History, signal: Signal) -> bool {
    let recent = prior.recent(CONFIRMATION_LOOKBACK);
    recent.len() == CONFIRMATION_LOOKBACK && recent.iter().all(|r| r.signal == signal)
}

pub fn recommend_trade(confirmed: bool, signal: Signal) -> TradeSignal {
    if !confirmed {
        TradeSignal::NoTrade
    } else if signal == Signal::Bullish {
        TradeSignal::CallBuyPutSell
    } else {
        TradeSignal::PutBuyCallSell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(state: &mut SessionState, put: f64, call: f64) -> Reading {
        let reading = TrendAnalyzer::new().analyze(OiSnapshot::new(put, call), state, Local::now());
        state.record(reading.clone());
        reading
    }

    #[test]
    fn test_end_to_end_four_ticks() {
        let mut state = SessionState::new();

        let first = tick(&mut state, 1000.0, 800.0);
        assert_eq!(first.put_change, 0.0);
        assert_eq!(first.call_change, 0.0);
        assert_eq!(first.difference, 200.0);
        assert_eq!(first.difference_change, 0.0);
        assert_eq!(first.signal, Signal::Neutral);
        assert_eq!(first.trade_signal, TradeSignal::NoTrade);

        let second = tick(&mut state, 1100.0, 850.0);
        assert_eq!(second.put_change, 100.0);
        assert_eq!(second.call_change, 50.0);
        assert_eq!(second.difference, 250.0);
        assert_eq!(second.difference_change, 50.0);
        assert_eq!(second.signal, Signal::Bullish);
        assert_eq!(second.weakness, "Put increased by 100");
        assert_eq!(second.trade_signal, TradeSignal::NoTrade);

        // prior signals are ["Bullish", ""], not both Bullish
        let third = tick(&mut state, 1200.0, 900.0);
        assert_eq!(third.signal, Signal::Bullish);
        assert_eq!(third.trade_signal, TradeSignal::NoTrade);
        assert!(!state.trend_confirmed());

        let fourth = tick(&mut state, 1300.0, 950.0);
        assert_eq!(fourth.signal, Signal::Bullish);
        assert_eq!(fourth.trade_signal, TradeSignal::CallBuyPutSell);
        assert!(state.trend_confirmed());

        let signals: Vec<Signal> = state.history().iter().map(|r| r.signal).collect();
        assert_eq!(
            signals,
            vec![Signal::Bullish, Signal::Bullish, Signal::Bullish, Signal::Neutral]
        );
    }

    #[test]
    fn test_history_capped_at_lookback_still_confirms() {
        let mut state = SessionState::new().with_max_entries(Some(CONFIRMATION_LOOKBACK));

        tick(&mut state, 1000.0, 800.0);
        tick(&mut state, 1100.0, 850.0);
        let third = tick(&mut state, 1200.0, 900.0);
        assert_eq!(third.trade_signal, TradeSignal::NoTrade);

        let fourth = tick(&mut state, 1300.0, 950.0);
        assert_eq!(fourth.trade_signal, TradeSignal::CallBuyPutSell);

        let fifth = tick(&mut state, 1400.0, 1000.0);
        assert_eq!(fifth.trade_signal, TradeSignal::CallBuyPutSell);
        assert_eq!(state.history().len(), CONFIRMATION_LOOKBACK);
    }

    #[test]
    fn test_signal_trichotomy() {
        assert_eq!(detect_signal(100.0, 50.0), Signal::Bullish);
        assert_eq!(detect_signal(50.0, 100.0), Signal::Bearish);
        assert_eq!(detect_signal(-10.0, -20.0), Signal::Bullish);
        assert_eq!(detect_signal(-20.0, -10.0), Signal::Bearish);
        assert_eq!(detect_signal(0.0, 0.0), Signal::Neutral);
        assert_eq!(detect_signal(-5.5, -5.5), Signal::Neutral);
    }

    #[test]
    fn test_weakness_text() {
        assert_eq!(describe_weakness(Signal::Bearish, -30.0, 10.0), "Put is weaker by 30");
        assert_eq!(describe_weakness(Signal::Bearish, 5.0, 40.0), "Call increased by 40");
        assert_eq!(describe_weakness(Signal::Bullish, 10.0, -25.0), "Call is weaker by 25");
        assert_eq!(describe_weakness(Signal::Bullish, 60.0, 0.0), "Put increased by 60");
        assert_eq!(describe_weakness(Signal::Neutral, 0.0, 0.0), "");
    }

    #[test]
    fn test_bearish_confirmation_recommends_put_buy() {
        let mut state = SessionState::new();
        tick(&mut state, 1000.0, 1000.0);
        tick(&mut state, 990.0, 1050.0);
        tick(&mut state, 980.0, 1100.0);
        let reading = tick(&mut state, 970.0, 1150.0);

        assert_eq!(reading.signal, Signal::Bearish);
        assert_eq!(reading.weakness, "Put is weaker by 10");
        assert_eq!(reading.trade_signal, TradeSignal::PutBuyCallSell);
    }

    #[test]
    fn test_flat_market_confirms_neutral_as_put_buy() {
        let mut state = SessionState::new();
        tick(&mut state, 500.0, 400.0);
        tick(&mut state, 500.0, 400.0);
        let reading = tick(&mut state, 500.0, 400.0);

        assert_eq!(reading.signal, Signal::Neutral);
        assert_eq!(reading.trade_signal, TradeSignal::PutBuyCallSell);
    }

    #[test]
    fn test_confirmation_needs_two_prior_readings() {
        let mut history = History::new();
        assert!(!is_trend_confirmed(&history, Signal::Neutral));

        let mut state = SessionState::new();
        tick(&mut state, 1.0, 1.0);
        history = state.history().clone();
        assert_eq!(history.len(), 1);
        assert!(!is_trend_confirmed(&history, Signal::Neutral));
    }

    #[test]
    fn test_confirmation_only_looks_two_back() {
        let mut state = SessionState::new();
        tick(&mut state, 1000.0, 800.0);
        tick(&mut state, 1100.0, 850.0); // Bullish
        tick(&mut state, 1200.0, 900.0); // Bullish
        tick(&mut state, 1300.0, 950.0); // Bullish, confirmed
        let broken = tick(&mut state, 1300.0, 1000.0); // Bearish
        assert_eq!(broken.signal, Signal::Bearish);
        assert_eq!(broken.trade_signal, TradeSignal::NoTrade);

        let resumed = tick(&mut state, 1400.0, 1000.0); // Bullish, priors [Bearish, Bullish]
        assert_eq!(resumed.trade_signal, TradeSignal::NoTrade);
    }

    #[test]
    fn test_difference_is_exact() {
        let state = SessionState::new();
        let reading =
            TrendAnalyzer::new().analyze(OiSnapshot::new(1234.5, 234.25), &state, Local::now());
        assert_eq!(reading.difference, 1234.5 - 234.25);
    }

    #[test]
    fn test_recommend_trade_table() {
        assert_eq!(recommend_trade(false, Signal::Bullish), TradeSignal::NoTrade);
        assert_eq!(recommend_trade(false, Signal::Bearish), TradeSignal::NoTrade);
        assert_eq!(recommend_trade(true, Signal::Bullish), TradeSignal::CallBuyPutSell);
        assert_eq!(recommend_trade(true, Signal::Bearish), TradeSignal::PutBuyCallSell);
        assert_eq!(recommend_trade(true, Signal::Neutral), TradeSignal::PutBuyCallSell);
    }

    #[test]
    fn test_time_is_hours_and_minutes() {
        let state = SessionState::new();
        let at = Local::now();
        let reading = TrendAnalyzer::new().analyze(OiSnapshot::new(1.0, 1.0), &state, at);
        assert_eq!(reading.time, at.format("%H:%M").to_string());
        assert_eq!(reading.time.len(), 5);
        assert_eq!(reading.timestamp, at.with_timezone(&Utc));
    }
}
