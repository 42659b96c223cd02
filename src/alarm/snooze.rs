//! Snooze rescheduling.
//!
//! A snooze is nothing more than rewriting an entry's scheduled time to a
//! near-future minute. The new `(id, time)` pair is a fresh occurrence key,
//! so the matcher fires it again without any snooze-specific state.

use std::fmt::Write;

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, NaiveDateTime};

use crate::schedule::store::ScheduleStore;

/// Default snooze length.
pub const DEFAULT_SNOOZE_MINUTES: u32 = 5;

/// `now + minutes`, rendered with the engine's minute format. Wraps past
/// midnight, since entries carry no date.
pub fn snooze_time(now: NaiveDateTime, minutes: u32, minute_format: &str) -> Result<String> {
    let target = now + Duration::minutes(minutes as i64);
    let mut out = String::new();
    write!(out, "{}", target.format(minute_format))
        .map_err(|_| anyhow!("invalid minute format: {minute_format:?}"))?;
    Ok(out)
}

/// Move entry `id` to `now + minutes` in `store`. Returns the new time.
pub fn snooze_entry(
    store: &dyn ScheduleStore,
    id: &str,
    now: NaiveDateTime,
    minutes: u32,
    minute_format: &str,
) -> Result<String> {
    let new_time = snooze_time(now, minutes, minute_format)?;
    store
        .update_time(id, &new_time)
        .with_context(|| format!("failed to snooze entry {id}"))?;
    tracing::info!(entry_id = %id, until = %new_time, "alarm snoozed");
    Ok(new_time)
}
