//! Occurrence matching: which schedule entries are newly due right now.

use std::fmt::Write;

use chrono::NaiveDateTime;

use super::ledger::Ledger;
use crate::schedule::types::ScheduleEntry;

/// `HH:mm`, the format schedule entries store their time in.
pub const DEFAULT_MINUTE_FORMAT: &str = "%H:%M";

/// Decides which entries become due on a tick and remembers what has fired.
#[derive(Debug, Clone)]
pub struct OccurrenceMatcher {
    ledger: Ledger,
    minute_format: String,
}

impl OccurrenceMatcher {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            minute_format: DEFAULT_MINUTE_FORMAT.to_string(),
        }
    }

    pub fn with_minute_format(mut self, format: impl Into<String>) -> Self {
        self.minute_format = format.into();
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// `now` rendered at minute granularity, or `None` if the configured
    /// format cannot be rendered.
    pub fn current_minute(&self, now: NaiveDateTime) -> Option<String> {
        let mut out = String::new();
        write!(out, "{}", now.format(&self.minute_format)).ok()?;
        Some(out)
    }

    /// Evaluate one tick.
    ///
    /// An entry is due iff its stored time equals the current minute, its
    /// occurrence key is not in the ledger, and it is not the alarm currently
    /// being presented. Due entries are recorded in the ledger before being
    /// returned, in schedule order, so a failed presentation never re-fires.
    pub fn evaluate(
        &mut self,
        now: NaiveDateTime,
        schedule: &[ScheduleEntry],
        active_alarm_id: Option<&str>,
    ) -> Vec<ScheduleEntry> {
        let Some(current_minute) = self.current_minute(now) else {
            tracing::warn!(format = %self.minute_format, "cannot render minute format, skipping tick");
            return Vec::new();
        };

        self.ledger.observe(now);

        let mut due = Vec::new();
        for entry in schedule {
            if entry.time != current_minute {
                continue;
            }
            if active_alarm_id == Some(entry.id.as_str()) {
                tracing::trace!(entry_id = %entry.id, "suppressed: alarm already presenting");
                continue;
            }

            let key = self.ledger.key_for(entry, now);
            if !self.ledger.record(key) {
                continue;
            }

            tracing::debug!(entry_id = %entry.id, time = %entry.time, "occurrence due");
            due.push(entry.clone());
        }
        due
    }
}

/// Stateless form of [`OccurrenceMatcher::evaluate`] over a caller-owned ledger.
pub fn evaluate(
    now: NaiveDateTime,
    schedule: &[ScheduleEntry],
    active_alarm_id: Option<&str>,
    ledger: &mut Ledger,
) -> Vec<ScheduleEntry> {
    let mut matcher = OccurrenceMatcher::new(std::mem::take(ledger));
    let due = matcher.evaluate(now, schedule, active_alarm_id);
    *ledger = matcher.ledger;
    due
}
