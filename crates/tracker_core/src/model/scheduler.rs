//! Scheduler record: the timing rule attached to one task.
//!
//! # Invariants
//! - `timing == Timing::Weekly` requires `day`.
//! - `time` is a wall-clock time of day without timezone.

use super::task::TaskId;
use super::{first_violation, EntityId, ModelValidationError};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub type SchedulerId = EntityId;

/// Canonical wire/storage format for `Scheduler::time`.
pub const TIME_FORMAT: &str = "%H:%M:%S";
const TIME_INPUT_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"];

/// Recurrence kind of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// Fires a single time.
    Once,
    Daily,
    /// Fires on `day` every week.
    Weekly,
    Monthly,
}

impl Timing {
    pub const ALL: [Timing; 4] = [Self::Once, Self::Daily, Self::Weekly, Self::Monthly];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|timing| timing.as_str() == value)
    }
}

/// Day of week a scheduler is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.as_str() == value)
    }
}

/// Persisted scheduler row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduler {
    pub id: SchedulerId,
    pub timing: Timing,
    pub day: Option<Day>,
    pub time: NaiveTime,
    pub task_id: TaskId,
}

/// Insert shape for a new scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduler {
    pub timing: Timing,
    pub day: Option<Day>,
    pub time: NaiveTime,
    pub task_id: TaskId,
}

impl Scheduler {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        first_violation(validate_timing_rule(self.timing, self.day))
    }
}

impl NewScheduler {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        first_violation(validate_timing_rule(self.timing, self.day))
    }
}

pub fn validate_timing_rule(timing: Timing, day: Option<Day>) -> Vec<ModelValidationError> {
    let mut errors = Vec::new();
    if timing == Timing::Weekly && day.is_none() {
        errors.push(ModelValidationError::new(
            "day",
            "This field is required when timing is \"weekly\".",
        ));
    }
    errors
}

/// Parses a time of day in `HH:MM[:SS[.fff]]` form.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    TIME_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
}

/// Formats a time of day in the canonical `HH:MM:SS` form.
pub fn format_time(value: NaiveTime) -> String {
    value.format(TIME_FORMAT).to_string()
}
