//! Dedup ledger of occurrences already fired.
//!
//! A [`Ledger`] is owned by exactly one [`OccurrenceMatcher`](super::matcher::OccurrenceMatcher)
//! and lives as long as the engine instance. Nothing here is persisted.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::schedule::types::ScheduleEntry;

/// When the ledger forgets what it has fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Clear whenever a tick lands on second zero of any minute. Keys are
    /// `(id, time)`; dedup only holds within the due minute.
    MinuteBoundary,
    /// Keys carry the calendar date and the ledger is cleared when the
    /// observed date changes.
    #[default]
    CalendarDay,
}

impl ResetPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MinuteBoundary => "minute_boundary",
            Self::CalendarDay => "calendar_day",
        }
    }
}

impl std::fmt::Display for ResetPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minute_boundary" => Ok(Self::MinuteBoundary),
            "calendar_day" => Ok(Self::CalendarDay),
            _ => Err(format!("unknown ledger reset policy: {s}")),
        }
    }
}

/// Identity of one occurrence: this entry becoming due at this time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccurrenceKey {
    pub entry_id: String,
    pub scheduled_time: String,
    /// Only set under [`ResetPolicy::CalendarDay`].
    pub date: Option<NaiveDate>,
}

impl std::fmt::Display for OccurrenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.date {
            Some(date) => write!(f, "{}-{}@{}", self.entry_id, self.scheduled_time, date),
            None => write!(f, "{}-{}", self.entry_id, self.scheduled_time),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    policy: ResetPolicy,
    fired: HashSet<OccurrenceKey>,
    /// Date of the most recent observation, for day rollover detection.
    last_date: Option<NaiveDate>,
}

impl Ledger {
    pub fn new(policy: ResetPolicy) -> Self {
        Self {
            policy,
            fired: HashSet::new(),
            last_date: None,
        }
    }

    pub fn policy(&self) -> ResetPolicy {
        self.policy
    }

    /// Apply the reset rule for a tick at `now`. Returns `true` if the ledger
    /// was cleared.
    pub fn observe(&mut self, now: NaiveDateTime) -> bool {
        let date = now.date();
        let rolled = match self.policy {
            ResetPolicy::MinuteBoundary => now.second() == 0,
            ResetPolicy::CalendarDay => self.last_date.is_some_and(|d| d != date),
        };
        self.last_date = Some(date);

        if rolled && !self.fired.is_empty() {
            tracing::debug!(policy = %self.policy, cleared = self.fired.len(), "ledger reset");
            self.fired.clear();
            return true;
        }
        false
    }

    /// The key `entry` would fire under at `now`.
    pub fn key_for(&self, entry: &ScheduleEntry, now: NaiveDateTime) -> OccurrenceKey {
        OccurrenceKey {
            entry_id: entry.id.clone(),
            scheduled_time: entry.time.clone(),
            date: match self.policy {
                ResetPolicy::MinuteBoundary => None,
                ResetPolicy::CalendarDay => Some(now.date()),
            },
        }
    }

    pub fn contains(&self, key: &OccurrenceKey) -> bool {
        self.fired.contains(key)
    }

    /// Record a fired occurrence. Returns `false` if it was already present.
    pub fn record(&mut self, key: OccurrenceKey) -> bool {
        self.fired.insert(key)
    }

    pub fn clear(&mut self) {
        self.fired.clear();
    }

    pub fn len(&self) -> usize {
        self.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}
