pub mod store;
pub mod types;

use types::ScheduleEntry;

/// Sort entries by scheduled time, the order the schedule is listed in.
///
/// Well-formed times sort chronologically; malformed ones go last, in their
/// original relative order.
pub fn sort_by_time(entries: &mut [ScheduleEntry]) {
    entries.sort_by_key(|e| match e.minute_of_day() {
        Ok(t) => (0, t.as_minutes()),
        Err(_) => (1, 0),
    });
}
