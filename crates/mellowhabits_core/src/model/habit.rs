//! Habit domain model.
//!
//! # Responsibility
//! - Define the canonical habit record persisted in the habit slot.
//! - Own the punch counter invariants so every mutation path clamps the same way.
//!
//! # Invariants
//! - `id` is stable and never reused for another habit.
//! - `current_punches <= total_goal` and `total_goal >= 1` for valid habits.
//! - `punch_dates` is chronological; new entries never precede the last one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a habit.
pub type HabitId = Uuid;

/// Icon used when the caller does not pick one.
pub const DEFAULT_ICON: &str = "star.fill";

/// Celebration threshold expressed as `NUMERATOR / DENOMINATOR` (80%).
const CELEBRATION_NUMERATOR: u64 = 4;
const CELEBRATION_DENOMINATOR: u64 = 5;

/// How a habit is presented and driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitKind {
    /// Goal of one, driven by `toggle`.
    Checklist,
    /// Multi-punch goal, driven by `punch`.
    Punchcard,
}

/// Validation failures for habit records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitValidationError {
    NilId,
    BlankTitle,
    ZeroGoal,
    PunchesExceedGoal { current: u32, goal: u32 },
    UnorderedPunchDates { index: usize },
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "habit id must not be nil"),
            Self::BlankTitle => write!(f, "habit title must not be blank"),
            Self::ZeroGoal => write!(f, "habit goal must be at least 1"),
            Self::PunchesExceedGoal { current, goal } => {
                write!(f, "habit has {current} punches but goal is {goal}")
            }
            Self::UnorderedPunchDates { index } => {
                write!(f, "punch date at index {index} precedes its predecessor")
            }
        }
    }
}

impl Error for HabitValidationError {}

/// Canonical habit record.
///
/// Serialized with camelCase keys to match the persisted slot layout.
/// Punch state is private; it only changes through the methods below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    id: HabitId,
    pub title: String,
    /// Free-text schedule label, e.g. "Morgens" or "3x Woche".
    pub time: String,
    pub icon: String,
    current_punches: u32,
    total_goal: u32,
    punch_dates: Vec<DateTime<Utc>>,
}

impl Habit {
    /// Creates a habit with a generated id, no punches and no punch dates.
    pub fn new(
        title: impl Into<String>,
        time: impl Into<String>,
        icon: Option<&str>,
        goal: u32,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), title, time, icon, goal)
    }

    /// Creates a habit with a caller-provided id.
    ///
    /// Does not validate; call [`Habit::validate`] before persisting.
    pub fn with_id(
        id: HabitId,
        title: impl Into<String>,
        time: impl Into<String>,
        icon: Option<&str>,
        goal: u32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            time: time.into(),
            icon: normalize_icon(icon),
            current_punches: 0,
            total_goal: goal,
            punch_dates: Vec::new(),
        }
    }

    pub fn id(&self) -> HabitId {
        self.id
    }

    pub fn current_punches(&self) -> u32 {
        self.current_punches
    }

    pub fn total_goal(&self) -> u32 {
        self.total_goal
    }

    pub fn punch_dates(&self) -> &[DateTime<Utc>] {
        &self.punch_dates
    }

    pub fn kind(&self) -> HabitKind {
        if self.total_goal <= 1 {
            HabitKind::Checklist
        } else {
            HabitKind::Punchcard
        }
    }

    /// Completion ratio in `[0.0, 1.0]`; `0.0` when the goal is zero.
    pub fn progress(&self) -> f64 {
        if self.total_goal == 0 {
            return 0.0;
        }
        f64::from(self.current_punches.min(self.total_goal)) / f64::from(self.total_goal)
    }

    pub fn is_complete(&self) -> bool {
        self.total_goal > 0 && self.current_punches >= self.total_goal
    }

    /// Returns whether at least 80% of the goal is punched.
    pub fn is_celebrated(&self) -> bool {
        celebration_reached(self.current_punches, self.total_goal)
    }

    /// Records one punch at `at` when below goal.
    ///
    /// Returns `false` without touching state once the goal is reached.
    pub fn punch(&mut self, at: DateTime<Utc>) -> bool {
        if self.current_punches >= self.total_goal {
            return false;
        }
        self.current_punches += 1;
        self.push_date(at);
        true
    }

    /// Binary completion toggle for checklist habits.
    ///
    /// Off -> on sets one punch and appends `at`. On -> off resets the
    /// counter to zero and drops only the most recent punch date.
    /// Returns the new on/off state.
    pub fn toggle(&mut self, at: DateTime<Utc>) -> bool {
        if self.current_punches == 0 {
            self.current_punches = 1;
            self.push_date(at);
            true
        } else {
            self.current_punches = 0;
            self.punch_dates.pop();
            false
        }
    }

    /// Changes the goal, clamping punches and trailing punch dates to fit.
    ///
    /// A goal of zero is raised to one.
    pub fn set_goal(&mut self, goal: u32) {
        self.total_goal = goal.max(1);
        if self.current_punches > self.total_goal {
            self.current_punches = self.total_goal;
            let keep = self.total_goal as usize;
            if self.punch_dates.len() > keep {
                self.punch_dates.truncate(keep);
            }
        }
    }

    /// Sets progress directly, clamped to `0..=total_goal`.
    ///
    /// Raising appends one date at `at` per added punch. Lowering drops the
    /// newest dates, one per removed punch. Returns the applied count.
    pub fn set_punches(&mut self, punches: u32, at: DateTime<Utc>) -> u32 {
        let target = punches.min(self.total_goal);
        if target > self.current_punches {
            for _ in self.current_punches..target {
                self.push_date(at);
            }
        } else {
            let removed = (self.current_punches - target) as usize;
            let keep = self.punch_dates.len().saturating_sub(removed);
            self.punch_dates.truncate(keep);
        }
        self.current_punches = target;
        target
    }

    /// Checks record invariants.
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        if self.id.is_nil() {
            return Err(HabitValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(HabitValidationError::BlankTitle);
        }
        if self.total_goal == 0 {
            return Err(HabitValidationError::ZeroGoal);
        }
        if self.current_punches > self.total_goal {
            return Err(HabitValidationError::PunchesExceedGoal {
                current: self.current_punches,
                goal: self.total_goal,
            });
        }
        if let Some(index) = self
            .punch_dates
            .windows(2)
            .position(|pair| pair[1] < pair[0])
        {
            return Err(HabitValidationError::UnorderedPunchDates { index: index + 1 });
        }
        Ok(())
    }

    // Clock skew must not reorder history: clamp to the last recorded punch.
    fn push_date(&mut self, at: DateTime<Utc>) {
        let stamp = match self.punch_dates.last() {
            Some(last) if *last > at => *last,
            _ => at,
        };
        self.punch_dates.push(stamp);
    }
}

/// Trims `icon`, falling back to [`DEFAULT_ICON`] when missing or blank.
pub fn normalize_icon(icon: Option<&str>) -> String {
    match icon.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => DEFAULT_ICON.to_string(),
    }
}

/// Returns whether `current / goal >= 0.8`, using exact integer arithmetic.
///
/// Always `false` for a zero goal.
pub fn celebration_reached(current: u32, goal: u32) -> bool {
    if goal == 0 {
        return false;
    }
    u64::from(current) * CELEBRATION_DENOMINATOR >= u64::from(goal) * CELEBRATION_NUMERATOR
}

#[cfg(test)]
mod tests {
    use super::{celebration_reached, Habit, HabitKind, HabitValidationError, DEFAULT_ICON};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn new_applies_default_icon_for_missing_or_blank_values() {
        assert_eq!(Habit::new("Read", "Morgens", None, 5).icon, DEFAULT_ICON);
        assert_eq!(Habit::new("Read", "Morgens", Some("  "), 5).icon, DEFAULT_ICON);
        assert_eq!(Habit::new("Read", "Morgens", Some("book"), 5).icon, "book");
    }

    #[test]
    fn celebration_boundary_is_inclusive() {
        assert!(celebration_reached(8, 10));
        assert!(!celebration_reached(7, 10));
        assert!(celebration_reached(80_000, 100_000));
        assert!(!celebration_reached(79_999, 100_000));
        assert!(!celebration_reached(5, 0));
        assert!(!celebration_reached(0, 0));
    }

    #[test]
    fn punch_clamps_timestamp_to_last_entry() {
        let mut habit = Habit::new("Walk", "Abends", None, 3);
        let later = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let earlier = later - Duration::hours(2);

        assert!(habit.punch(later));
        assert!(habit.punch(earlier));
        assert_eq!(habit.punch_dates(), &[later, later]);
        assert!(habit.validate().is_ok());
    }

    #[test]
    fn set_goal_clamps_punches_and_dates() {
        let mut habit = Habit::new("Stretch", "Täglich", None, 10);
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        for _ in 0..6 {
            habit.punch(at);
        }

        habit.set_goal(4);
        assert_eq!(habit.current_punches(), 4);
        assert_eq!(habit.punch_dates().len(), 4);

        habit.set_goal(0);
        assert_eq!(habit.total_goal(), 1);
        assert_eq!(habit.current_punches(), 1);
    }

    #[test]
    fn set_punches_clamps_and_keeps_dates_in_step() {
        let mut habit = Habit::new("Lesen", "Täglich", None, 5);
        let first = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let second = first + Duration::days(1);
        habit.punch(first);

        assert_eq!(habit.set_punches(3, second), 3);
        assert_eq!(habit.punch_dates(), &[first, second, second]);

        assert_eq!(habit.set_punches(1, second), 1);
        assert_eq!(habit.punch_dates(), &[first]);

        assert_eq!(habit.set_punches(99, second), 5);
        assert_eq!(habit.punch_dates().len(), 5);

        assert_eq!(habit.set_punches(0, second), 0);
        assert!(habit.punch_dates().is_empty());
        assert!(habit.validate().is_ok());
    }

    #[test]
    fn kind_follows_goal() {
        assert_eq!(Habit::new("a", "b", None, 1).kind(), HabitKind::Checklist);
        assert_eq!(Habit::new("a", "b", None, 10).kind(), HabitKind::Punchcard);
    }

    #[test]
    fn validate_rejects_blank_title_and_zero_goal() {
        assert_eq!(
            Habit::new("  ", "Morgens", None, 1).validate(),
            Err(HabitValidationError::BlankTitle)
        );
        assert_eq!(
            Habit::new("Read", "Morgens", None, 0).validate(),
            Err(HabitValidationError::ZeroGoal)
        );
    }
}
