//! CLI `doctor` command: check the schedule for entries that can never fire.

use anyhow::Result;
use std::collections::HashMap;

use crate::config::DoseBellConfig;
use crate::schedule::store::{JsonFileStore, ScheduleStore};
use crate::schedule::types::ScheduleEntry;

/// Problems found in a schedule.
#[derive(Debug, Default)]
pub struct ScheduleReport {
    pub total: usize,
    /// `(id, time)` of entries whose time is not a valid `HH:mm`.
    pub malformed: Vec<(String, String)>,
    /// Ids that appear more than once.
    pub duplicate_ids: Vec<String>,
}

impl ScheduleReport {
    pub fn is_healthy(&self) -> bool {
        self.malformed.is_empty() && self.duplicate_ids.is_empty()
    }
}

pub fn check_schedule(entries: &[ScheduleEntry]) -> ScheduleReport {
    let mut report = ScheduleReport {
        total: entries.len(),
        ..Default::default()
    };

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        if entry.minute_of_day().is_err() {
            report.malformed.push((entry.id.clone(), entry.time.clone()));
        }
        *seen.entry(entry.id.as_str()).or_default() += 1;
    }

    report.duplicate_ids = seen
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(id, _)| id.to_string())
        .collect();
    report.duplicate_ids.sort();
    report
}

pub fn doctor(config: &DoseBellConfig) -> Result<()> {
    let path = config.resolved_schedule_path();

    println!("DoseBell Health Report");
    println!("======================");
    println!();
    println!("Schedule file:     {}", path.display());
    println!("Tick interval:     {} ms", config.engine.tick_interval_ms);
    println!("Ledger reset:      {}", config.engine.ledger_reset);
    println!("Snooze:            {} min", config.alarm.snooze_minutes);
    println!();

    if !path.exists() {
        println!("Schedule: not found. Run `dosebell add` to create it.");
        return Ok(());
    }

    let store = JsonFileStore::new(&path);
    let entries = match store.list() {
        Ok(entries) => entries,
        Err(e) => {
            println!("Schedule:          UNREADABLE ({e})");
            return Ok(());
        }
    };

    let report = check_schedule(&entries);
    println!("Entries:           {}", report.total);
    for (id, time) in &report.malformed {
        println!("  WARNING: entry {id} has invalid time {time:?}; it will never fire");
    }
    for id in &report.duplicate_ids {
        println!("  WARNING: id {id} is used by more than one entry");
    }
    if report.is_healthy() {
        println!("Status:            OK");
    }

    Ok(())
}
