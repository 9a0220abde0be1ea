//! Utility functions and helpers

use std::time::Duration;

/// Format an OI value the way it is displayed and stored in text.
///
/// Whole numbers print without a fractional part; `-0` prints as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Format a change with an explicit `+` for positive values.
///
/// Negative values keep their own `-`; zero gets no prefix.
pub fn format_signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", format_number(value))
    } else {
        format_number(value)
    }
}

/// Format a remaining duration as zero-padded `MM:SS`.
pub fn format_countdown(remaining: Duration) -> String {
    let millis = remaining.as_millis();
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1_000;
    format!("{:02}:{:02}", minutes, seconds)
}
