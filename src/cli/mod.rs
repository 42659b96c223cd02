pub mod add;
pub mod doctor;
pub mod list;
pub mod remove;
pub mod snooze;
pub mod watch;
