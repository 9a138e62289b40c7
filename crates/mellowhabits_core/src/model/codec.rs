//! JSON codec and record migration for the persisted habit slot.
//!
//! # Responsibility
//! - Encode the full habit collection as one JSON array.
//! - Upgrade older records before typed decoding, under an explicit policy.
//! - Reject decoded records that break `Habit::validate()`.
//!
//! # Invariants
//! - Base fields (`id`, `title`, `time`, `currentPunches`, `totalGoal`) are
//!   never defaulted.
//! - `currentPunches > totalGoal` is clamped under `FillDefaults` and
//!   rejected under `Strict`.
//! - Decoding is all-or-nothing; no partial collections are returned.

use crate::config::MigrationPolicy;
use crate::model::habit::{Habit, HabitValidationError, DEFAULT_ICON};
use log::info;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ICON_FIELD: &str = "icon";
const PUNCH_DATES_FIELD: &str = "punchDates";
const CURRENT_PUNCHES_FIELD: &str = "currentPunches";
const TOTAL_GOAL_FIELD: &str = "totalGoal";

/// Record-shape failures found before typed decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    NotAnArray,
    NotAnObject { index: usize },
    MissingField { index: usize, field: &'static str },
    PunchesExceedGoal { index: usize, current: u64, goal: u64 },
}

impl Display for MigrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnArray => write!(f, "stored habits are not a JSON array"),
            Self::NotAnObject { index } => write!(f, "stored habit #{index} is not an object"),
            Self::MissingField { index, field } => {
                write!(f, "stored habit #{index} is missing field `{field}`")
            }
            Self::PunchesExceedGoal {
                index,
                current,
                goal,
            } => write!(
                f,
                "stored habit #{index} has {current} punches but goal is {goal}"
            ),
        }
    }
}

impl Error for MigrationError {}

/// Codec error for the habit slot.
#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    Migration(MigrationError),
    Invalid {
        index: usize,
        error: HabitValidationError,
    },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "{err}"),
            Self::Migration(err) => write!(f, "{err}"),
            Self::Invalid { index, error } => write!(f, "stored habit #{index}: {error}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Migration(err) => Some(err),
            Self::Invalid { error, .. } => Some(error),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<MigrationError> for CodecError {
    fn from(value: MigrationError) -> Self {
        Self::Migration(value)
    }
}

/// Counts of fields filled in by the migration step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub records: usize,
    pub filled_icons: usize,
    pub filled_punch_dates: usize,
    /// Records whose punches exceeded their goal and were clamped.
    pub clamped_punches: usize,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.filled_icons == 0 && self.filled_punch_dates == 0 && self.clamped_punches == 0
    }
}

/// Serializes the collection in display order.
pub fn encode_habits(habits: &[Habit]) -> Result<String, CodecError> {
    Ok(serde_json::to_string(habits)?)
}

/// Parses, migrates, decodes and validates a stored blob.
pub fn decode_habits(
    blob: &str,
    policy: MigrationPolicy,
) -> Result<(Vec<Habit>, MigrationReport), CodecError> {
    let mut value: Value = serde_json::from_str(blob)?;
    let report = migrate_records(&mut value, policy)?;
    let habits: Vec<Habit> = serde_json::from_value(value)?;

    for (index, habit) in habits.iter().enumerate() {
        habit
            .validate()
            .map_err(|error| CodecError::Invalid { index, error })?;
    }

    if !report.is_noop() {
        info!(
            "event=habit_records_migrated module=codec status=ok records={} filled_icons={} filled_punch_dates={} clamped_punches={}",
            report.records, report.filled_icons, report.filled_punch_dates, report.clamped_punches
        );
    }

    Ok((habits, report))
}

/// Upgrades every record of a stored array in place.
pub fn migrate_records(
    value: &mut Value,
    policy: MigrationPolicy,
) -> Result<MigrationReport, MigrationError> {
    let records = value.as_array_mut().ok_or(MigrationError::NotAnArray)?;
    let mut report = MigrationReport {
        records: records.len(),
        ..MigrationReport::default()
    };

    for (index, record) in records.iter_mut().enumerate() {
        let object = record
            .as_object_mut()
            .ok_or(MigrationError::NotAnObject { index })?;
        if fill_missing(
            object,
            index,
            ICON_FIELD,
            || Value::String(DEFAULT_ICON.to_string()),
            policy,
        )? {
            report.filled_icons += 1;
        }
        if fill_missing(
            object,
            index,
            PUNCH_DATES_FIELD,
            || Value::Array(Vec::new()),
            policy,
        )? {
            report.filled_punch_dates += 1;
        }
        if clamp_punches(object, index, policy)? {
            report.clamped_punches += 1;
        }
    }

    Ok(report)
}

// Older editors let the goal drop below the punch count. Clamp the way
// `Habit::set_goal` does: cap the counter and drop the newest dates.
fn clamp_punches(
    object: &mut Map<String, Value>,
    index: usize,
    policy: MigrationPolicy,
) -> Result<bool, MigrationError> {
    let current = object.get(CURRENT_PUNCHES_FIELD).and_then(Value::as_u64);
    let goal = object.get(TOTAL_GOAL_FIELD).and_then(Value::as_u64);
    let (Some(current), Some(goal)) = (current, goal) else {
        // Missing or mistyped counters are left to typed decoding.
        return Ok(false);
    };
    if current <= goal {
        return Ok(false);
    }
    if policy == MigrationPolicy::Strict {
        return Err(MigrationError::PunchesExceedGoal {
            index,
            current,
            goal,
        });
    }

    object.insert(CURRENT_PUNCHES_FIELD.to_string(), Value::from(goal));
    if let Some(Value::Array(dates)) = object.get_mut(PUNCH_DATES_FIELD) {
        let excess = usize::try_from(current - goal).unwrap_or(usize::MAX);
        let keep = dates.len().saturating_sub(excess);
        dates.truncate(keep);
    }
    Ok(true)
}

fn fill_missing(
    object: &mut Map<String, Value>,
    index: usize,
    field: &'static str,
    default: impl FnOnce() -> Value,
    policy: MigrationPolicy,
) -> Result<bool, MigrationError> {
    if object.contains_key(field) {
        return Ok(false);
    }
    match policy {
        MigrationPolicy::Strict => Err(MigrationError::MissingField { index, field }),
        MigrationPolicy::FillDefaults => {
            object.insert(field.to_string(), default());
            Ok(true)
        }
    }
}
