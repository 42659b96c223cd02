mod helpers;

use helpers::entry;
use dosebell::engine::poller::ScheduleSource;
use dosebell::error::ScheduleError;
use dosebell::schedule::store::{JsonFileStore, ScheduleStore};
use dosebell::schedule::sort_by_time;
use tempfile::TempDir;

#[test]
fn missing_file_is_an_empty_schedule() {
    let tmp = TempDir::new().unwrap();
    let store = JsonFileStore::new(tmp.path().join("schedule.json"));
    assert!(store.list().unwrap().is_empty());
    assert!(store.schedule().unwrap().is_empty());
}

#[test]
fn upsert_creates_file_and_parent_dirs() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("schedule.json");
    let store = JsonFileStore::new(&path);

    store.upsert(entry("a", "08:00")).unwrap();
    store.upsert(entry("b", "20:00")).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());

    // A second store over the same file sees the writes
    let other = JsonFileStore::new(&path);
    let ids: Vec<String> = other.list().unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn upsert_replaces_by_id() {
    let tmp = TempDir::new().unwrap();
    let store = JsonFileStore::new(tmp.path().join("schedule.json"));

    store.upsert(entry("a", "08:00")).unwrap();
    let mut changed = entry("a", "08:15");
    changed.dosage = "2 tablets".into();
    store.upsert(changed).unwrap();

    let all = store.list().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].time, "08:15");
    assert_eq!(all[0].dosage, "2 tablets");
}

#[test]
fn update_time_and_remove() {
    let tmp = TempDir::new().unwrap();
    let store = JsonFileStore::new(tmp.path().join("schedule.json"));
    store.upsert(entry("a", "08:00")).unwrap();

    store.update_time("a", "08:05").unwrap();
    assert_eq!(store.get("a").unwrap().unwrap().time, "08:05");

    assert!(matches!(
        store.update_time("missing", "09:00"),
        Err(ScheduleError::NotFound(id)) if id == "missing"
    ));

    assert!(store.remove("a").unwrap());
    assert!(!store.remove("a").unwrap());
    assert!(store.get("a").unwrap().is_none());
}

#[test]
fn corrupt_file_is_a_json_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("schedule.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = JsonFileStore::new(&path);
    assert!(matches!(store.list(), Err(ScheduleError::Json { .. })));
    assert!(store.schedule().is_err());
}

#[test]
fn reads_entries_written_by_hand() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("schedule.json");
    std::fs::write(
        &path,
        r#"[
            {"id": "m2", "name": "Metformin", "dosage": "500mg", "time": "19:30", "foodContext": "after"},
            {"id": "m1", "name": "Levothyroxine", "dosage": "50mcg", "time": "06:45", "foodContext": "before",
             "reminderText": "Wait 30 minutes before breakfast"},
            {"id": "m3", "name": "Broken", "dosage": "1", "time": "7pm"}
        ]"#,
    )
    .unwrap();

    let mut entries = JsonFileStore::new(&path).list().unwrap();
    sort_by_time(&mut entries);
    let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2", "m3"]);
    assert_eq!(
        entries[0].reminder_text.as_deref(),
        Some("Wait 30 minutes before breakfast")
    );
}
