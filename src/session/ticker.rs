//! Tick sources driving the session engine.
//!
//! The engine never owns a timer. A host polls a [`TickSource`] only while
//! the countdown is running, so pausing stops tick delivery entirely.

use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};

/// Default tick period: one cooking second.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// A serialized source of countdown ticks.
#[allow(async_fn_in_trait)]
pub trait TickSource {
    /// Waits for the next tick.
    ///
    /// Returns false once the source can never tick again.
    async fn next_tick(&mut self) -> bool;

    /// Restarts the period so the next tick is a full period away.
    fn reset(&mut self);
}

// ============================================================================
// IntervalTickSource
// ============================================================================

/// Real-time tick source backed by `tokio::time::interval`.
pub struct IntervalTickSource {
    interval: Interval,
    period: Duration,
}

impl IntervalTickSource {
    /// Creates a tick source firing once per second.
    pub fn new() -> Self {
        Self::with_period(DEFAULT_TICK_PERIOD)
    }

    /// Creates a tick source with a custom period.
    ///
    /// Each tick still counts as one second of cooking time.
    pub fn with_period(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval, period }
    }

    /// Returns the tick period.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for IntervalTickSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for IntervalTickSource {
    async fn next_tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }

    fn reset(&mut self) {
        self.interval.reset();
    }
}

// ============================================================================
// ManualTickSource
// ============================================================================

/// Deterministic tick source fed by a [`ManualTicker`].
pub struct ManualTickSource {
    rx: mpsc::UnboundedReceiver<()>,
    resets: usize,
}

/// Handle used to push ticks into a [`ManualTickSource`].
#[derive(Debug, Clone)]
pub struct ManualTicker {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTickSource {
    /// Creates a manual tick source and its feeding handle.
    pub fn new() -> (Self, ManualTicker) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx, resets: 0 }, ManualTicker { tx })
    }

    /// Number of times the source was reset.
    pub fn reset_count(&self) -> usize {
        self.resets
    }
}

impl ManualTicker {
    /// Queues one tick.
    pub fn tick(&self) {
        let _ = self.tx.send(());
    }

    /// Queues `count` ticks.
    pub fn tick_n(&self, count: usize) {
        for _ in 0..count {
            self.tick();
        }
    }
}

impl TickSource for ManualTickSource {
    async fn next_tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}
