//! Fetch → analyze → render cycle driven by a single countdown

use chrono::Local;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::application::presenter::Presenter;
use crate::domain::history::HistoryStore;
use crate::domain::trend::{SessionState, TrendAnalyzer};
use crate::infrastructure::market_data::OiSource;
use crate::shared::types::{OiSnapshot, Reading};

/// Outcome of advancing the countdown by one display tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Tick(Duration),
    Elapsed,
}

/// One logical timer: the interval is consumed in display-tick steps.
#[derive(Debug, Clone)]
pub struct Countdown {
    interval: Duration,
    tick: Duration,
    remaining: Duration,
}

impl Countdown {
    /// A zero `tick` is bumped to 1ms so the countdown always terminates.
    pub fn new(interval: Duration, tick: Duration) -> Self {
        let tick = tick.max(Duration::from_millis(1));
        Self {
            interval,
            tick,
            remaining: interval,
        }
    }

    pub fn reset(&mut self) {
        self.remaining = self.interval;
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn advance(&mut self) -> CountdownEvent {
        self.remaining = self.remaining.saturating_sub(self.tick);
        if self.remaining.is_zero() {
            CountdownEvent::Elapsed
        } else {
            CountdownEvent::Tick(self.remaining)
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub tick: Duration,
    /// Stop after this many cycles; `None` runs until shutdown.
    pub max_cycles: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(60_000),
            tick: Duration::from_millis(1_000),
            max_cycles: None,
        }
    }
}

/// Owns the session and runs cycles strictly one after another
pub struct Scheduler {
    source: Box<dyn OiSource>,
    store: Box<dyn HistoryStore>,
    presenter: Presenter,
    analyzer: TrendAnalyzer,
    session: SessionState,
    countdown: Countdown,
    max_cycles: Option<u64>,
    cycles_run: u64,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        source: Box<dyn OiSource>,
        store: Box<dyn HistoryStore>,
        presenter: Presenter,
        session: SessionState,
    ) -> Self {
        Self {
            source,
            store,
            presenter,
            analyzer: TrendAnalyzer::new(),
            session,
            countdown: Countdown::new(config.interval, config.tick),
            max_cycles: config.max_cycles,
            cycles_run: 0,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    /// One fetch → analyze → record → save → render pass.
    ///
    /// Returns `None` when the tick was skipped: the fetch failed, or the
    /// values overflowed to a non-finite reading that cannot be persisted.
    pub async fn run_cycle(&mut self) -> Option<Reading> {
        self.cycles_run += 1;

        let snapshot = fetch_or_skip(self.source.as_ref()).await?;
        let reading = self.analyzer.analyze(snapshot, &self.session, Local::now());
        if !reading.is_finite() {
            warn!(
                "⚠️ Non-finite reading from put={} call={}, skipping this tick",
                snapshot.put_value, snapshot.call_value
            );
            return None;
        }

        self.presenter.show_snapshot(&snapshot);
        info!(
            "📊 put={} call={} diff={} signal={:?} trade=\"{}\"",
            reading.put, reading.call, reading.difference, reading.signal, reading.trade_signal
        );

        self.session.record(reading.clone());
        if let Err(e) = self.store.save(self.session.history()) {
            error!("❌ Failed to save history: {}", e);
        }

        self.presenter.show_history(self.session.history());
        Some(reading)
    }

    /// Run until `max_cycles` is reached or `shutdown` resolves.
    ///
    /// Shutdown is observed between countdown ticks; an in-flight cycle
    /// always completes first. Returns the number of cycles run.
    pub async fn run_until<F>(&mut self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            self.run_cycle().await;

            if self.max_cycles.is_some_and(|max| self.cycles_run >= max) {
                info!("Completed {} cycle(s), stopping", self.cycles_run);
                return self.cycles_run;
            }

            self.countdown.reset();
            self.presenter.show_countdown(self.countdown.remaining());

            loop {
                tokio::select! {
                    _ = &mut shutdown => {
                        info!("Shutdown requested after {} cycle(s)", self.cycles_run);
                        return self.cycles_run;
                    }
                    _ = tokio::time::sleep(self.countdown.tick()) => {}
                }

                match self.countdown.advance() {
                    CountdownEvent::Tick(remaining) => self.presenter.show_countdown(remaining),
                    CountdownEvent::Elapsed => {
                        self.presenter.show_countdown(Duration::ZERO);
                        break;
                    }
                }
            }
        }
    }
}

/// Absent result means "skip this tick"; no retry beyond the next tick.
pub async fn fetch_or_skip(source: &dyn OiSource) -> Option<OiSnapshot> {
    match source.fetch().await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!("⚠️ Error fetching OI data, skipping this tick: {}", e);
            None
        }
    }
}
