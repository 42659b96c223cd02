use anyhow::Result;

use crate::config::DoseBellConfig;
use crate::schedule::store::{JsonFileStore, ScheduleStore};

pub fn remove(config: &DoseBellConfig, id: &str) -> Result<()> {
    let store = JsonFileStore::new(config.resolved_schedule_path());
    if store.remove(id)? {
        tracing::info!(entry_id = %id, "entry removed");
        println!("Removed {id}");
    } else {
        println!("No entry with id {id}");
    }
    Ok(())
}
