//! The caller side of the engine: which alarm is on screen, and what the
//! user does with it.
//!
//! [`AlarmController`] owns the [`AlarmState`] machine (`Idle` or
//! `Presenting(entry)`). It is plugged into the poller as both the
//! [`FireHandler`] and the [`ActiveAlarmSource`], so the entry being
//! presented is never re-fired while it is on screen. Entries that come due
//! while another alarm is presenting wait in a FIFO queue and are presented
//! in turn after each dismiss or snooze.

pub mod message;
pub mod snooze;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;

use crate::engine::clock::Clock;
use crate::engine::matcher::DEFAULT_MINUTE_FORMAT;
use crate::engine::poller::{ActiveAlarmSource, FireHandler};
use crate::schedule::store::ScheduleStore;
use crate::schedule::types::ScheduleEntry;

/// Presentation state for the single alarm slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AlarmState {
    #[default]
    Idle,
    Presenting(ScheduleEntry),
}

impl AlarmState {
    pub fn active_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Presenting(entry) => Some(&entry.id),
        }
    }
}

/// How a presented alarm ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Dismissed,
    Snoozed { until: String },
}

/// Display/audio layer. Implementations show the alarm and start playback.
pub trait AlarmPresenter: Send + Sync {
    fn present(&self, entry: &ScheduleEntry) -> Result<()>;

    /// Called after the user dismisses or snoozes `entry`.
    fn resolved(&self, _entry: &ScheduleEntry, _resolution: &Resolution) {}
}

#[derive(Debug, Default)]
struct Inner {
    state: AlarmState,
    pending: VecDeque<ScheduleEntry>,
}

pub struct AlarmController {
    inner: Mutex<Inner>,
    store: Arc<dyn ScheduleStore>,
    presenter: Arc<dyn AlarmPresenter>,
    clock: Arc<dyn Clock>,
    snooze_minutes: u32,
    minute_format: String,
}

impl AlarmController {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        presenter: Arc<dyn AlarmPresenter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            store,
            presenter,
            clock,
            snooze_minutes: snooze::DEFAULT_SNOOZE_MINUTES,
            minute_format: DEFAULT_MINUTE_FORMAT.to_string(),
        }
    }

    pub fn with_snooze_minutes(mut self, minutes: u32) -> Self {
        self.snooze_minutes = minutes;
        self
    }

    pub fn with_minute_format(mut self, format: impl Into<String>) -> Self {
        self.minute_format = format.into();
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| anyhow!("alarm state lock poisoned: {e}"))
    }

    pub fn state(&self) -> Result<AlarmState> {
        Ok(self.lock()?.state.clone())
    }

    /// Ids waiting behind the presenting alarm, oldest first.
    pub fn pending(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.pending.iter().map(|e| e.id.clone()).collect())
    }

    /// Dismiss the presenting alarm. Returns it, or `None` when idle.
    pub fn dismiss(&self) -> Result<Option<ScheduleEntry>> {
        let entry = {
            let mut inner = self.lock()?;
            match std::mem::take(&mut inner.state) {
                AlarmState::Idle => return Ok(None),
                AlarmState::Presenting(entry) => entry,
            }
        };

        tracing::info!(entry_id = %entry.id, "alarm dismissed");
        self.presenter.resolved(&entry, &Resolution::Dismissed);
        self.present_next()?;
        Ok(Some(entry))
    }

    /// Snooze the presenting alarm to `snooze_minutes` from the clock's now.
    pub fn snooze(&self) -> Result<Option<String>> {
        self.snooze_at(self.clock.now())
    }

    /// Snooze relative to an explicit time. On store failure the alarm keeps
    /// presenting and the error is returned.
    pub fn snooze_at(&self, now: NaiveDateTime) -> Result<Option<String>> {
        let entry = match &self.lock()?.state {
            AlarmState::Idle => return Ok(None),
            AlarmState::Presenting(entry) => entry.clone(),
        };

        let until = snooze::snooze_entry(
            self.store.as_ref(),
            &entry.id,
            now,
            self.snooze_minutes,
            &self.minute_format,
        )?;

        {
            let mut inner = self.lock()?;
            if inner.state.active_id() == Some(entry.id.as_str()) {
                inner.state = AlarmState::Idle;
            }
        }

        self.presenter.resolved(
            &entry,
            &Resolution::Snoozed {
                until: until.clone(),
            },
        );
        self.present_next()?;
        Ok(Some(until))
    }

    /// Move queued entries into the alarm slot until one presents cleanly.
    fn present_next(&self) -> Result<()> {
        loop {
            let next = {
                let mut inner = self.lock()?;
                if inner.state != AlarmState::Idle {
                    return Ok(());
                }
                let Some(next) = inner.pending.pop_front() else {
                    return Ok(());
                };
                inner.state = AlarmState::Presenting(next.clone());
                next
            };

            match self.presenter.present(&next) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::error!(entry_id = %next.id, error = %e, "failed to present queued alarm");
                    self.lock()?.state = AlarmState::Idle;
                }
            }
        }
    }
}

impl FireHandler for AlarmController {
    fn on_fire(&self, entry: &ScheduleEntry) -> Result<()> {
        {
            let mut inner = self.lock()?;
            if inner.state != AlarmState::Idle {
                let duplicate = inner.state.active_id() == Some(entry.id.as_str())
                    || inner.pending.iter().any(|e| e.id == entry.id);
                if !duplicate {
                    tracing::debug!(entry_id = %entry.id, "alarm busy, queued");
                    inner.pending.push_back(entry.clone());
                }
                return Ok(());
            }
            inner.state = AlarmState::Presenting(entry.clone());
        }

        if let Err(e) = self.presenter.present(entry) {
            self.lock()?.state = AlarmState::Idle;
            return Err(e.context(format!("failed to present alarm {}", entry.id)));
        }
        Ok(())
    }
}

impl ActiveAlarmSource for AlarmController {
    fn active_alarm(&self) -> Result<Option<String>> {
        Ok(self.lock()?.state.active_id().map(str::to_string))
    }
}
