//! Clock poller: the repeating timer that drives occurrence matching.
//!
//! [`ClockPoller::start`] spawns a tokio task that wakes every
//! `tick_interval`, re-reads the schedule and the active alarm, runs the
//! [`OccurrenceMatcher`] and hands each due entry to the [`FireHandler`].
//! Nothing that happens inside a tick can stop the loop: provider errors,
//! handler errors and panics are logged and the next tick runs as usual.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::clock::Clock;
use super::matcher::OccurrenceMatcher;
use crate::schedule::types::ScheduleEntry;

/// Default wake-up cadence.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

// ── Provider traits ──────────────────────────────────────────────────────────

/// Supplies the current schedule, read fresh on every tick.
pub trait ScheduleSource: Send + Sync {
    fn schedule(&self) -> Result<Vec<ScheduleEntry>>;
}

/// Names the entry currently being presented to the user, if any.
pub trait ActiveAlarmSource: Send + Sync {
    fn active_alarm(&self) -> Result<Option<String>>;
}

/// Receives each due occurrence exactly once.
pub trait FireHandler: Send + Sync {
    fn on_fire(&self, entry: &ScheduleEntry) -> Result<()>;
}

impl<F> ScheduleSource for F
where
    F: Fn() -> Result<Vec<ScheduleEntry>> + Send + Sync,
{
    fn schedule(&self) -> Result<Vec<ScheduleEntry>> {
        self()
    }
}

impl<F> ActiveAlarmSource for F
where
    F: Fn() -> Result<Option<String>> + Send + Sync,
{
    fn active_alarm(&self) -> Result<Option<String>> {
        self()
    }
}

impl<F> FireHandler for F
where
    F: Fn(&ScheduleEntry) -> Result<()> + Send + Sync,
{
    fn on_fire(&self, entry: &ScheduleEntry) -> Result<()> {
        self(entry)
    }
}

/// Run `f`, converting a panic into an error.
fn isolate<T>(what: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".into());
            Err(anyhow!("{what} panicked: {msg}"))
        }
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickReport {
    /// The schedule or active alarm could not be read; nothing was matched.
    ReadFailed,
    /// Matching ran. `fired` lists the ids handed to the handler, in order.
    Evaluated {
        fired: Vec<String>,
        callback_failures: usize,
    },
    /// The poller has been stopped; the tick did nothing.
    Stopped,
}

impl TickReport {
    pub fn fired(&self) -> &[String] {
        match self {
            Self::Evaluated { fired, .. } => fired,
            _ => &[],
        }
    }
}

/// One matcher wired to its collaborators. [`AlarmEngine::tick`] is the body
/// of every poller wake-up and can be driven directly without a timer.
pub struct AlarmEngine {
    matcher: OccurrenceMatcher,
    clock: Arc<dyn Clock>,
    schedule: Arc<dyn ScheduleSource>,
    active: Arc<dyn ActiveAlarmSource>,
    on_fire: Arc<dyn FireHandler>,
}

impl AlarmEngine {
    pub fn new(
        matcher: OccurrenceMatcher,
        clock: Arc<dyn Clock>,
        schedule: Arc<dyn ScheduleSource>,
        active: Arc<dyn ActiveAlarmSource>,
        on_fire: Arc<dyn FireHandler>,
    ) -> Self {
        Self {
            matcher,
            clock,
            schedule,
            active,
            on_fire,
        }
    }

    pub fn matcher(&self) -> &OccurrenceMatcher {
        &self.matcher
    }

    /// Sample the clock, read both providers and fire every due entry.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();

        let schedule = match isolate("schedule provider", || self.schedule.schedule()) {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!(error = %e, "schedule read failed, skipping tick");
                return TickReport::ReadFailed;
            }
        };
        let active = match isolate("active alarm provider", || self.active.active_alarm()) {
            Ok(active) => active,
            Err(e) => {
                warn!(error = %e, "active alarm read failed, skipping tick");
                return TickReport::ReadFailed;
            }
        };

        let due = self.matcher.evaluate(now, &schedule, active.as_deref());

        let mut fired = Vec::with_capacity(due.len());
        let mut callback_failures = 0;
        for entry in &due {
            info!(entry_id = %entry.id, time = %entry.time, "alarm fired");
            if let Err(e) = isolate("fire handler", || self.on_fire.on_fire(entry)) {
                error!(entry_id = %entry.id, error = %e, "fire handler failed");
                callback_failures += 1;
            }
            fired.push(entry.id.clone());
        }

        TickReport::Evaluated {
            fired,
            callback_failures,
        }
    }
}

// ── Poller ───────────────────────────────────────────────────────────────────

struct Slot {
    engine: AlarmEngine,
    stopped: bool,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    // Ticks never panic while holding the lock (handlers run under
    // catch_unwind), so a poisoned lock still holds a consistent engine.
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

/// Builder for a running poller.
pub struct ClockPoller {
    matcher: OccurrenceMatcher,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
}

impl ClockPoller {
    pub fn new(matcher: OccurrenceMatcher, clock: Arc<dyn Clock>) -> Self {
        Self {
            matcher,
            clock,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Spawn the repeating wake-up on the current tokio runtime.
    pub fn start(
        self,
        schedule: Arc<dyn ScheduleSource>,
        active: Arc<dyn ActiveAlarmSource>,
        on_fire: Arc<dyn FireHandler>,
    ) -> PollerHandle {
        let engine = AlarmEngine::new(self.matcher, self.clock, schedule, active, on_fire);
        let slot = Arc::new(Mutex::new(Slot {
            engine,
            stopped: false,
        }));

        let tick_interval = self.tick_interval;
        let task_slot = Arc::clone(&slot);
        let task = tokio::spawn(async move {
            info!(interval_ms = tick_interval.as_millis() as u64, "alarm poller started");
            let mut interval = tokio::time::interval(tick_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                let mut slot = lock(&task_slot);
                if slot.stopped {
                    break;
                }
                let report = slot.engine.tick();
                drop(slot);
                debug!(?report, "tick");
            }
            debug!("alarm poller loop exited");
        });

        PollerHandle {
            slot,
            task: Mutex::new(Some(task)),
        }
    }
}

/// Handle to a running poller.
pub struct PollerHandle {
    slot: Arc<Mutex<Slot>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollerHandle {
    /// Cancel the poller. Idempotent.
    ///
    /// Waits for an in-flight tick to finish, so no fire handler runs after
    /// this returns. Must not be called from inside a fire handler.
    pub fn stop(&self) {
        {
            let mut slot = lock(&self.slot);
            if slot.stopped {
                return;
            }
            slot.stopped = true;
        }

        if let Some(task) = self.task.lock().unwrap_or_else(|e| e.into_inner()).take() {
            task.abort();
        }
        info!("alarm poller stopped");
    }

    pub fn is_stopped(&self) -> bool {
        lock(&self.slot).stopped
    }

    /// Run one tick immediately, outside the timer cadence.
    pub fn tick_now(&self) -> TickReport {
        let mut slot = lock(&self.slot);
        if slot.stopped {
            return TickReport::Stopped;
        }
        slot.engine.tick()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
