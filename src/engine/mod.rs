//! The alarm-triggering engine.
//!
//! - [`clock`] — wall-clock sources ([`clock::SystemClock`], [`clock::ManualClock`])
//! - [`ledger`] — occurrence keys and the dedup ledger
//! - [`matcher`] — decides which entries are newly due on a tick
//! - [`poller`] — the repeating timer and its provider/handler seams

pub mod clock;
pub mod ledger;
pub mod matcher;
pub mod poller;

use std::sync::Arc;
use std::time::Duration;

use crate::config::EngineConfig;
use clock::Clock;
use ledger::Ledger;
use matcher::OccurrenceMatcher;
use poller::ClockPoller;

/// Build a poller from configuration.
pub fn poller_from_config(config: &EngineConfig, clock: Arc<dyn Clock>) -> ClockPoller {
    let matcher = OccurrenceMatcher::new(Ledger::new(config.ledger_reset));
    ClockPoller::new(matcher, clock)
        .with_tick_interval(Duration::from_millis(config.tick_interval_ms))
}
