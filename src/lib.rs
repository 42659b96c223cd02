//! Medication reminder alarms.
//!
//! DoseBell watches a schedule of daily medication times and raises an alarm
//! exactly once when each one comes due. The core is a small, wall-clock
//! driven engine:
//!
//! - a **clock poller** wakes at a fixed cadence (1s by default) and re-reads
//!   the schedule and the alarm currently on screen;
//! - an **occurrence matcher** compares each entry's `HH:mm` time against the
//!   current minute and consults a dedup **ledger** so that every
//!   `(entry, time)` occurrence fires at most once, no matter how many ticks
//!   land inside the due minute.
//!
//! Everything around it (storage, display, audio, snoozing) is supplied by
//! the caller. The [`alarm`] module provides the standard caller: a single
//! alarm slot (`Idle | Presenting`) with a queue for alarms that come due
//! while another is showing.
//!
//! The engine is best effort: a minute missed while the process is suspended
//! is not fired late, and nothing is persisted across restarts.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`schedule`] — Schedule entries and stores
//! - [`engine`] — Clock, ledger, matcher and poller
//! - [`alarm`] — Alarm presentation state, snooze and reminder text
//! - [`error`] — Schedule-layer error type

pub mod alarm;
pub mod config;
pub mod engine;
pub mod error;
pub mod schedule;
