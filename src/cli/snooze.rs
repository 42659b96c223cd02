//! CLI `snooze` command: push one entry a few minutes into the future.

use anyhow::Result;

use crate::alarm::snooze::snooze_entry;
use crate::config::DoseBellConfig;
use crate::engine::clock::{Clock, SystemClock};
use crate::engine::matcher::DEFAULT_MINUTE_FORMAT;
use crate::schedule::store::JsonFileStore;

pub fn snooze(config: &DoseBellConfig, id: &str, minutes: Option<u32>) -> Result<()> {
    let store = JsonFileStore::new(config.resolved_schedule_path());
    let minutes = minutes.unwrap_or(config.alarm.snooze_minutes);
    let until = snooze_entry(
        &store,
        id,
        SystemClock.now(),
        minutes,
        DEFAULT_MINUTE_FORMAT,
    )?;
    println!("Snoozed {id} until {until}");
    Ok(())
}
