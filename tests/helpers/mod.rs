#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use dosebell::alarm::{AlarmPresenter, Resolution};
use dosebell::engine::poller::FireHandler;
use dosebell::schedule::types::ScheduleEntry;

/// 2026-03-14 at `h:m:s`.
pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    on_day(14, h, m, s)
}

/// 2026-03-`day` at `h:m:s`.
pub fn on_day(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, day)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

/// A named entry with the given id and time.
pub fn entry(id: &str, time: &str) -> ScheduleEntry {
    let mut e = ScheduleEntry::new(id, time);
    e.name = format!("Med {id}");
    e.dosage = "1 tablet".into();
    e
}

pub fn ids(entries: &[ScheduleEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.id.as_str()).collect()
}

/// Fire handler that records every entry id it is given.
#[derive(Default)]
pub struct Recorder {
    fired: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fired(&self) -> Vec<String> {
        self.fired.lock().unwrap().clone()
    }
}

impl FireHandler for Recorder {
    fn on_fire(&self, entry: &ScheduleEntry) -> Result<()> {
        self.fired.lock().unwrap().push(entry.id.clone());
        Ok(())
    }
}

/// Presenter that records what was shown and how it ended. Can be told to
/// fail for specific ids.
#[derive(Default)]
pub struct RecordingPresenter {
    pub shown: Mutex<Vec<String>>,
    pub resolutions: Mutex<Vec<(String, Resolution)>>,
    pub fail_ids: Mutex<Vec<String>>,
}

impl RecordingPresenter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_for(&self, id: &str) {
        self.fail_ids.lock().unwrap().push(id.to_string());
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }

    pub fn resolutions(&self) -> Vec<(String, Resolution)> {
        self.resolutions.lock().unwrap().clone()
    }
}

impl AlarmPresenter for RecordingPresenter {
    fn present(&self, entry: &ScheduleEntry) -> Result<()> {
        if self.fail_ids.lock().unwrap().contains(&entry.id) {
            anyhow::bail!("display unavailable");
        }
        self.shown.lock().unwrap().push(entry.id.clone());
        Ok(())
    }

    fn resolved(&self, entry: &ScheduleEntry, resolution: &Resolution) {
        self.resolutions
            .lock()
            .unwrap()
            .push((entry.id.clone(), resolution.clone()));
    }
}
