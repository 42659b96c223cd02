//! CLI `list` command: print the schedule sorted by time.

use anyhow::Result;

use crate::alarm::message::headline;
use crate::config::DoseBellConfig;
use crate::schedule::sort_by_time;
use crate::schedule::store::{JsonFileStore, ScheduleStore};

pub fn list(config: &DoseBellConfig) -> Result<()> {
    let store = JsonFileStore::new(config.resolved_schedule_path());
    let mut entries = store.list()?;

    if entries.is_empty() {
        println!("No medications scheduled ({}).", store.path().display());
        return Ok(());
    }

    sort_by_time(&mut entries);

    println!("Medication Schedule");
    println!("{}", "=".repeat(40));
    for entry in &entries {
        println!("  {:<6} {}  [{}]", entry.time, headline(entry), entry.id);
        if let Some(ref note) = entry.reminder_text {
            println!("         note: {note}");
        }
    }
    println!();
    println!("{} entries", entries.len());

    Ok(())
}
