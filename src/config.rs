use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::alarm::snooze::DEFAULT_SNOOZE_MINUTES;
use crate::engine::ledger::ResetPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DoseBellConfig {
    pub log: LogConfig,
    pub storage: StorageConfig,
    pub engine: EngineConfig,
    pub alarm: AlarmConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub schedule_path: String,
}

/// Engine tuning. The minute format is not configurable here: stored entry
/// times, `add`, `doctor` and snooze all use `HH:mm`.
#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub tick_interval_ms: u64,
    pub ledger_reset: ResetPolicy,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AlarmConfig {
    pub snooze_minutes: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let schedule_path = default_dosebell_dir()
            .join("schedule.json")
            .to_string_lossy()
            .into_owned();
        Self { schedule_path }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            ledger_reset: ResetPolicy::CalendarDay,
        }
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            snooze_minutes: DEFAULT_SNOOZE_MINUTES,
        }
    }
}

/// Returns `~/.dosebell/`
pub fn default_dosebell_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dosebell")
}

/// Returns the default config file path: `~/.dosebell/config.toml`
pub fn default_config_path() -> PathBuf {
    default_dosebell_dir().join("config.toml")
}

impl DoseBellConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            DoseBellConfig::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (DOSEBELL_SCHEDULE, DOSEBELL_LOG_LEVEL,
    /// DOSEBELL_TICK_MS).
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("DOSEBELL_SCHEDULE") {
            self.storage.schedule_path = val;
        }
        if let Ok(val) = std::env::var("DOSEBELL_LOG_LEVEL") {
            self.log.level = val;
        }
        if let Ok(val) = std::env::var("DOSEBELL_TICK_MS") {
            self.engine.tick_interval_ms = val
                .parse()
                .with_context(|| format!("DOSEBELL_TICK_MS is not a number: {val:?}"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.engine.tick_interval_ms > 0,
            "engine.tick_interval_ms must be greater than zero"
        );
        Ok(())
    }

    /// Resolve the schedule file path, expanding `~` if needed.
    pub fn resolved_schedule_path(&self) -> PathBuf {
        expand_tilde(&self.storage.schedule_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DoseBellConfig::default();
        assert_eq!(config.log.level, "info");
        assert_eq!(config.engine.tick_interval_ms, 1000);
        assert_eq!(config.engine.ledger_reset, ResetPolicy::CalendarDay);
        assert_eq!(config.alarm.snooze_minutes, 5);
        assert!(config.storage.schedule_path.ends_with("schedule.json"));
        config.validate().unwrap();
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[log]
level = "debug"

[engine]
ledger_reset = "minute_boundary"
tick_interval_ms = 250

[alarm]
snooze_minutes = 10
"#;
        let config: DoseBellConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.engine.ledger_reset, ResetPolicy::MinuteBoundary);
        assert_eq!(config.engine.tick_interval_ms, 250);
        assert_eq!(config.alarm.snooze_minutes, 10);
        // defaults still apply for unset fields
        assert!(config.storage.schedule_path.ends_with("schedule.json"));
    }

    #[test]
    fn minute_format_is_not_a_config_key() {
        let toml_str = r#"
[engine]
minute_format = "%H%M"
"#;
        let err = toml::from_str::<DoseBellConfig>(toml_str).unwrap_err();
        assert!(err.to_string().contains("minute_format"), "{err}");
    }

    #[test]
    fn rejects_zero_tick_interval() {
        let mut config = DoseBellConfig::default();
        config.engine.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = DoseBellConfig::default();
        std::env::set_var("DOSEBELL_SCHEDULE", "/tmp/override.json");
        std::env::set_var("DOSEBELL_LOG_LEVEL", "trace");
        std::env::set_var("DOSEBELL_TICK_MS", "50");

        config.apply_env_overrides().unwrap();

        assert_eq!(config.storage.schedule_path, "/tmp/override.json");
        assert_eq!(config.log.level, "trace");
        assert_eq!(config.engine.tick_interval_ms, 50);

        // Clean up
        std::env::remove_var("DOSEBELL_SCHEDULE");
        std::env::remove_var("DOSEBELL_LOG_LEVEL");
        std::env::remove_var("DOSEBELL_TICK_MS");
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = expand_tilde("~/meds.json");
        assert!(expanded.ends_with("meds.json"));
        assert_eq!(expand_tilde("/abs/meds.json"), PathBuf::from("/abs/meds.json"));
    }
}
