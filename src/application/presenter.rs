//! Rendering of readings and the refresh countdown

use std::fmt::Write as _;
use std::io::{self, Stdout, Write};
use std::time::Duration;

use crate::domain::history::History;
use crate::shared::types::{OiSnapshot, Reading};
use crate::shared::utils::{format_countdown, format_number, format_signed};

/// Output regions the presenter writes into
pub trait DisplaySurface: Send {
    fn set_put_value(&mut self, value: &str);
    fn set_call_value(&mut self, value: &str);
    fn set_countdown(&mut self, text: &str);
    /// Replace the whole results region.
    fn set_results(&mut self, rendered: &str);
}

/// Plain stdout surface; the countdown redraws in place
pub struct TerminalDisplay {
    out: Stdout,
    countdown_active: bool,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            countdown_active: false,
        }
    }

    fn end_countdown_line(&mut self) {
        if self.countdown_active {
            let _ = writeln!(self.out);
            self.countdown_active = false;
        }
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySurface for TerminalDisplay {
    fn set_put_value(&mut self, value: &str) {
        self.end_countdown_line();
        let _ = writeln!(self.out, "Put OI:  {}", value);
    }

    fn set_call_value(&mut self, value: &str) {
        self.end_countdown_line();
        let _ = writeln!(self.out, "Call OI: {}", value);
    }

    fn set_countdown(&mut self, text: &str) {
        let _ = write!(self.out, "\rNext refresh in {}", text);
        let _ = self.out.flush();
        self.countdown_active = true;
    }

    fn set_results(&mut self, rendered: &str) {
        self.end_countdown_line();
        let _ = write!(self.out, "{}", rendered);
        let _ = self.out.flush();
    }
}

/// Stateless projection of session data onto a surface
pub struct Presenter {
    surface: Box<dyn DisplaySurface>,
}

impl Presenter {
    pub fn new(surface: Box<dyn DisplaySurface>) -> Self {
        Self { surface }
    }

    pub fn show_snapshot(&mut self, snapshot: &OiSnapshot) {
        self.surface.set_put_value(&format_number(snapshot.put_value));
        self.surface.set_call_value(&format_number(snapshot.call_value));
    }

    pub fn show_history(&mut self, history: &History) {
        self.surface.set_results(&render_history(history));
    }

    pub fn show_countdown(&mut self, remaining: Duration) {
        self.surface.set_countdown(&format_countdown(remaining));
    }
}

/// Full re-render of every reading, numbered from 1, newest first.
pub fn render_history(history: &History) -> String {
    let mut out = String::new();
    for (index, reading) in history.iter().enumerate() {
        out.push_str(&render_reading(index + 1, reading));
        out.push('\n');
    }
    out
}

pub fn render_reading(number: usize, reading: &Reading) -> String {
    let diff_change = if reading.difference_change != 0.0 {
        format!(" ({})", format_signed(reading.difference_change))
    } else {
        String::new()
    };

    let mut block = String::new();
    let _ = writeln!(block, "{}. Time: {}", number, reading.time);
    let _ = writeln!(
        block,
        "   Put OI: {}, Call OI: {} (Difference: {}{})",
        format_number(reading.put),
        format_number(reading.call),
        format_number(reading.difference),
        diff_change
    );
    let _ = writeln!(block, "   Put Change: {}", format_signed(reading.put_change));
    let _ = writeln!(block, "   Call Change: {}", format_signed(reading.call_change));
    let _ = writeln!(block, "   Signal: {}", reading.signal);
    let _ = writeln!(block, "   Weakness: {}", reading.weakness);
    let _ = writeln!(block, "   Trading Signal: {}", reading.trade_signal);
    block
}
