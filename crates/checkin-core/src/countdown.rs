//! Countdown engine.
//!
//! Owns the single periodic evaluation for one account. Each tick samples
//! the clock and re-derives eligibility from `last_check_in`, so the
//! displayed countdown never drifts from the real boundary even when ticks
//! are delayed or skipped.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::new(SystemClock, sink);
//! engine.start(record.last_check_in); // publishes now, then every second
//! // after a confirmed check-in:
//! engine.start(new_record.last_check_in); // replaces the old ticker
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::eligibility::{self, EligibilityState};
use crate::events::Event;
use crate::sink::UiSink;

/// Period between evaluations.
pub const TICK: Duration = Duration::from_secs(1);

/// Periodic eligibility publisher.
///
/// `start` must be called from within a tokio runtime.
pub struct CountdownEngine<C, S> {
    clock: Arc<C>,
    sink: Arc<S>,
    last_check_in: Option<u64>,
    ticker: Option<JoinHandle<()>>,
}

impl<C, S> CountdownEngine<C, S>
where
    C: Clock + 'static,
    S: UiSink + 'static,
{
    pub fn new(clock: C, sink: S) -> Self {
        Self::with_shared(Arc::new(clock), Arc::new(sink))
    }

    pub fn with_shared(clock: Arc<C>, sink: Arc<S>) -> Self {
        Self {
            clock,
            sink,
            last_check_in: None,
            ticker: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Timestamp the current countdown was started with.
    pub fn last_check_in(&self) -> Option<u64> {
        self.last_check_in
    }

    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Evaluate against the clock now without publishing.
    ///
    /// Before the first `start` there is no record, which reads as eligible.
    pub fn current(&self) -> EligibilityState {
        eligibility::evaluate(self.last_check_in.unwrap_or(0), self.clock.now())
    }

    /// Current clock reading, the time every event from this engine carries.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace any running countdown with one for `last_check_in`.
    ///
    /// Publishes the current state immediately and then once per `TICK`
    /// until the next `start`, `stop`, or drop. Returns the state that was
    /// published immediately.
    pub fn start(&mut self, last_check_in: u64) -> EligibilityState {
        self.stop();
        self.last_check_in = Some(last_check_in);

        let state = publish(&*self.clock, &*self.sink, last_check_in);
        info!(last_check_in, ?state, "countdown started");

        let clock = Arc::clone(&self.clock);
        let sink = Arc::clone(&self.sink);
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + TICK, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                publish(&*clock, &*sink, last_check_in);
            }
        }));
        state
    }

    /// Cancel the running countdown, if any.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            debug!("countdown stopped");
            ticker.abort();
        }
    }
}

impl<C, S> Drop for CountdownEngine<C, S> {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

fn publish<C: Clock + ?Sized, S: UiSink + ?Sized>(
    clock: &C,
    sink: &S,
    last_check_in: u64,
) -> EligibilityState {
    let now = clock.now();
    let state = eligibility::evaluate(last_check_in, now);
    sink.publish(&Event::from_state(state, now));
    state
}
