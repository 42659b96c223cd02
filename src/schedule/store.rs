//! Schedule persistence.
//!
//! The alarm engine treats storage as an opaque snapshot provider: every tick
//! calls [`ScheduleStore::list`] and works on whatever comes back. Two stores
//! are provided: [`MemoryStore`] for tests and embedding, and [`JsonFileStore`]
//! which keeps the schedule in a JSON array on disk.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::engine::poller::ScheduleSource;
use crate::error::{Result, ScheduleError};
use crate::schedule::types::ScheduleEntry;

/// Storage for schedule entries.
pub trait ScheduleStore: Send + Sync {
    /// All entries, in storage order.
    fn list(&self) -> Result<Vec<ScheduleEntry>>;

    /// Insert a new entry or replace the one with the same id.
    fn upsert(&self, entry: ScheduleEntry) -> Result<()>;

    /// Delete an entry. Returns `false` when no entry had that id.
    fn remove(&self, id: &str) -> Result<bool>;

    /// Rewrite the scheduled time of one entry (snooze).
    fn update_time(&self, id: &str, time: &str) -> Result<()>;

    fn get(&self, id: &str) -> Result<Option<ScheduleEntry>> {
        Ok(self.list()?.into_iter().find(|e| e.id == id))
    }
}

/// Apply an upsert to an in-memory list.
fn upsert_into(entries: &mut Vec<ScheduleEntry>, entry: ScheduleEntry) {
    if let Some(existing) = entries.iter_mut().find(|e| e.id == entry.id) {
        *existing = entry;
    } else {
        entries.push(entry);
    }
}

fn update_time_in(entries: &mut [ScheduleEntry], id: &str, time: &str) -> Result<()> {
    let entry = entries
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or_else(|| ScheduleError::NotFound(id.to_string()))?;
    entry.time = time.to_string();
    Ok(())
}

// ── In-memory store ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<ScheduleEntry>>,
}

impl MemoryStore {
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl ScheduleStore for MemoryStore {
    fn list(&self) -> Result<Vec<ScheduleEntry>> {
        let entries = self.entries.lock().map_err(|_| ScheduleError::Poisoned)?;
        Ok(entries.clone())
    }

    fn upsert(&self, entry: ScheduleEntry) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| ScheduleError::Poisoned)?;
        upsert_into(&mut entries, entry);
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool> {
        let mut entries = self.entries.lock().map_err(|_| ScheduleError::Poisoned)?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() != before)
    }

    fn update_time(&self, id: &str, time: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| ScheduleError::Poisoned)?;
        update_time_in(&mut entries, id, time)
    }
}

impl ScheduleSource for MemoryStore {
    fn schedule(&self) -> anyhow::Result<Vec<ScheduleEntry>> {
        Ok(self.list()?)
    }
}

// ── JSON file store ──────────────────────────────────────────────────────────

/// Schedule kept as a JSON array of entries.
///
/// The file is re-read on every `list()`, so edits made by another process
/// (or another `dosebell` command) are picked up on the next tick. A missing
/// file is an empty schedule. Writes go to `<file>.tmp` and are renamed into
/// place.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<ScheduleEntry>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(ScheduleError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents).map_err(|source| ScheduleError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, entries: &[ScheduleEntry]) -> Result<()> {
        let io_err = |source| ScheduleError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(entries).map_err(|source| ScheduleError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, json).map_err(io_err)?;
        std::fs::rename(&tmp_path, &self.path).map_err(io_err)?;

        tracing::debug!(path = %self.path.display(), entries = entries.len(), "schedule written");
        Ok(())
    }

    /// Read-modify-write under the store's write lock.
    fn modify<T>(&self, f: impl FnOnce(&mut Vec<ScheduleEntry>) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock().map_err(|_| ScheduleError::Poisoned)?;
        let mut entries = self.read()?;
        let out = f(&mut entries)?;
        self.write(&entries)?;
        Ok(out)
    }
}

impl ScheduleStore for JsonFileStore {
    fn list(&self) -> Result<Vec<ScheduleEntry>> {
        self.read()
    }

    fn upsert(&self, entry: ScheduleEntry) -> Result<()> {
        self.modify(|entries| {
            upsert_into(entries, entry);
            Ok(())
        })
    }

    fn remove(&self, id: &str) -> Result<bool> {
        self.modify(|entries| {
            let before = entries.len();
            entries.retain(|e| e.id != id);
            Ok(entries.len() != before)
        })
    }

    fn update_time(&self, id: &str, time: &str) -> Result<()> {
        self.modify(|entries| update_time_in(entries, id, time))
    }
}

impl ScheduleSource for JsonFileStore {
    fn schedule(&self) -> anyhow::Result<Vec<ScheduleEntry>> {
        Ok(self.list()?)
    }
}
