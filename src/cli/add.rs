//! CLI `add` command: validate and store a new schedule entry.

use anyhow::{Context, Result};

use crate::config::DoseBellConfig;
use crate::schedule::store::{JsonFileStore, ScheduleStore};
use crate::schedule::types::{FoodContext, MinuteOfDay, ScheduleEntry};

pub struct NewEntry {
    pub name: String,
    pub dosage: String,
    pub time: String,
    pub food: FoodContext,
    pub note: Option<String>,
    pub language: String,
}

/// Validate `new` and turn it into an entry with a fresh UUID v7 id.
pub fn build_entry(new: NewEntry) -> Result<ScheduleEntry> {
    anyhow::ensure!(
        new.name.trim().chars().count() >= 2,
        "name must be at least 2 characters"
    );
    anyhow::ensure!(!new.dosage.trim().is_empty(), "dosage is required");
    let time: MinuteOfDay = new.time.parse()?;

    Ok(ScheduleEntry {
        id: uuid::Uuid::now_v7().to_string(),
        name: new.name.trim().to_string(),
        dosage: new.dosage.trim().to_string(),
        time: time.to_string(),
        language: new.language,
        audio_uri: None,
        reminder_text: new.note.filter(|n| !n.trim().is_empty()),
        food_context: new.food,
    })
}

pub fn add(config: &DoseBellConfig, new: NewEntry) -> Result<()> {
    let entry = build_entry(new)?;
    let store = JsonFileStore::new(config.resolved_schedule_path());
    store
        .upsert(entry.clone())
        .context("failed to save schedule entry")?;

    tracing::info!(entry_id = %entry.id, time = %entry.time, "entry added");
    println!("Added {} at {} [{}]", entry.name, entry.time, entry.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_entry(name: &str, time: &str) -> NewEntry {
        NewEntry {
            name: name.into(),
            dosage: "1 tablet".into(),
            time: time.into(),
            food: FoodContext::Any,
            note: Some("  ".into()),
            language: "en-US".into(),
        }
    }

    #[test]
    fn normalizes_time_and_drops_blank_note() {
        let entry = build_entry(new_entry("Aspirin", "8:05")).unwrap();
        assert_eq!(entry.time, "08:05");
        assert!(entry.reminder_text.is_none());
        assert!(!entry.id.is_empty());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(build_entry(new_entry("A", "08:00")).is_err());
        assert!(build_entry(new_entry("Aspirin", "25:00")).is_err());
    }
}
