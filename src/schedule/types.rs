//! Schedule entry type definitions.
//!
//! Defines [`ScheduleEntry`] (one medication's recurring daily reminder),
//! [`MinuteOfDay`] (a validated `HH:mm` time) and [`FoodContext`].

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// When the dose should be taken relative to a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodContext {
    Before,
    After,
    #[default]
    Any,
}

impl FoodContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Any => "any",
        }
    }
}

impl std::fmt::Display for FoodContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FoodContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            "any" => Ok(Self::Any),
            _ => Err(format!("unknown food context: {s}")),
        }
    }
}

/// A time of day at minute granularity, `00:00` through `23:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTime(format!("{hour}:{minute:02}")));
        }
        Ok(Self(hour as u16 * 60 + minute as u16))
    }

    pub fn hour(&self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(&self) -> u8 {
        (self.0 % 60) as u8
    }

    /// Minutes elapsed since midnight.
    pub fn as_minutes(&self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl std::str::FromStr for MinuteOfDay {
    type Err = ScheduleError;

    /// Accepts `H:mm` or `HH:mm`; the minute must always be two digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScheduleError::InvalidTime(s.to_string());

        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !(1..=2).contains(&h.len()) || m.len() != 2 || !all_digits(h) || !all_digits(m) {
            return Err(invalid());
        }

        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

/// One medication's recurring daily reminder, as held by the schedule store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Opaque stable identifier, unique within the schedule.
    pub id: String,
    /// Medication name shown in the alarm.
    #[serde(default)]
    pub name: String,
    /// Dose description, e.g. `"2 tablets"`.
    #[serde(default)]
    pub dosage: String,
    /// Scheduled time of day as stored (`HH:mm`). Kept raw: a malformed
    /// value is never rejected here, it simply never matches a clock minute.
    #[serde(default)]
    pub time: String,
    /// BCP 47 language tag used for the spoken reminder.
    #[serde(default = "default_language")]
    pub language: String,
    /// Pre-generated audio for the reminder, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_uri: Option<String>,
    /// Extra text the user wants read out with the reminder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_text: Option<String>,
    #[serde(default)]
    pub food_context: FoodContext,
}

fn default_language() -> String {
    "en-US".into()
}

impl ScheduleEntry {
    /// Build an entry with only the fields the alarm engine looks at.
    pub fn new(id: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            dosage: String::new(),
            time: time.into(),
            language: default_language(),
            audio_uri: None,
            reminder_text: None,
            food_context: FoodContext::Any,
        }
    }

    /// Parse the stored time. Returns an error for malformed values.
    pub fn minute_of_day(&self) -> Result<MinuteOfDay, ScheduleError> {
        self.time.parse()
    }
}
