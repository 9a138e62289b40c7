//! Read-only projections over the habit collection.
//!
//! Calendar arithmetic is done in UTC; punch dates are stored in UTC.

use crate::model::habit::{Habit, HabitKind};
use chrono::{Duration, NaiveDate};

/// Checklist view filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecklistFilter {
    #[default]
    All,
    /// Below goal.
    Open,
    /// Goal reached.
    Done,
}

/// Punches recorded on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayActivity {
    pub day: NaiveDate,
    pub punches: usize,
}

/// Aggregate numbers for the statistics screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSummary {
    pub habits: usize,
    pub total_punches: u64,
    pub celebrated: usize,
    pub completed: usize,
}

/// Sum of current punches across all habits.
pub fn total_punches(habits: &[Habit]) -> u64 {
    habits
        .iter()
        .map(|habit| u64::from(habit.current_punches()))
        .sum()
}

/// Habits at or above the celebration threshold, in display order.
pub fn celebrated_habits(habits: &[Habit]) -> Vec<&Habit> {
    habits.iter().filter(|habit| habit.is_celebrated()).collect()
}

/// Checklist habits matching `filter`, in display order.
pub fn checklist(habits: &[Habit], filter: ChecklistFilter) -> Vec<&Habit> {
    habits
        .iter()
        .filter(|habit| habit.kind() == HabitKind::Checklist)
        .filter(|habit| match filter {
            ChecklistFilter::All => true,
            ChecklistFilter::Open => !habit.is_complete(),
            ChecklistFilter::Done => habit.is_complete(),
        })
        .collect()
}

/// Longest window `daily_activity` will build.
pub const MAX_ACTIVITY_DAYS: u32 = 366;

/// Punch counts for the `days` calendar days ending at `today`, oldest first.
///
/// `days` is capped at [`MAX_ACTIVITY_DAYS`]. Returns an empty window when
/// `days` is zero or the window would start before the earliest date.
pub fn daily_activity(habits: &[Habit], today: NaiveDate, days: u32) -> Vec<DayActivity> {
    let days = days.min(MAX_ACTIVITY_DAYS);
    if days == 0 {
        return Vec::new();
    }
    let Some(first) = today.checked_sub_signed(Duration::days(i64::from(days) - 1)) else {
        return Vec::new();
    };
    let mut window: Vec<DayActivity> = (0..i64::from(days))
        .map(|offset| DayActivity {
            day: first + Duration::days(offset),
            punches: 0,
        })
        .collect();

    for stamp in habits.iter().flat_map(|habit| habit.punch_dates()) {
        let day = stamp.date_naive();
        if day < first || day > today {
            continue;
        }
        let slot = (day - first).num_days() as usize;
        window[slot].punches += 1;
    }

    window
}

pub fn summarize(habits: &[Habit]) -> StatsSummary {
    StatsSummary {
        habits: habits.len(),
        total_punches: total_punches(habits),
        celebrated: habits.iter().filter(|habit| habit.is_celebrated()).count(),
        completed: habits.iter().filter(|habit| habit.is_complete()).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        checklist, daily_activity, summarize, total_punches, ChecklistFilter, MAX_ACTIVITY_DAYS,
    };
    use crate::model::habit::Habit;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn fixture() -> Vec<Habit> {
        let at = Utc.with_ymd_and_hms(2026, 5, 10, 9, 30, 0).unwrap();
        let mut done = Habit::new("Wasser", "Morgens", None, 1);
        done.toggle(at);
        let open = Habit::new("Yoga", "Abends", None, 1);
        let mut card = Habit::new("Lesen", "Täglich", None, 10);
        for day in 0..8 {
            card.punch(at + Duration::days(day - 7));
        }
        vec![done, open, card]
    }

    #[test]
    fn checklist_filter_splits_open_and_done() {
        let habits = fixture();

        assert_eq!(checklist(&habits, ChecklistFilter::All).len(), 2);
        let open = checklist(&habits, ChecklistFilter::Open);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].title, "Yoga");
        let done = checklist(&habits, ChecklistFilter::Done);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].title, "Wasser");
    }

    #[test]
    fn summary_counts_punches_and_celebrations() {
        let habits = fixture();
        let summary = summarize(&habits);

        assert_eq!(total_punches(&habits), 9);
        assert_eq!(summary.habits, 3);
        assert_eq!(summary.total_punches, 9);
        // 1/1 and 8/10 both reach the threshold.
        assert_eq!(summary.celebrated, 2);
        assert_eq!(summary.completed, 1);
    }

    #[test]
    fn daily_activity_buckets_trailing_window() {
        let habits = fixture();
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();

        let week = daily_activity(&habits, today, 7);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].day, NaiveDate::from_ymd_opt(2026, 5, 4).unwrap());
        assert_eq!(week[6].day, today);
        // Two punches on the last day (card + checklist), one on each earlier day.
        assert_eq!(week[6].punches, 2);
        assert!(week[..6].iter().all(|day| day.punches == 1));

        assert!(daily_activity(&habits, today, 0).is_empty());
    }

    #[test]
    fn daily_activity_caps_oversized_windows() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();

        let window = daily_activity(&[], today, 200_000_000);
        assert_eq!(window.len(), MAX_ACTIVITY_DAYS as usize);
        assert_eq!(window.last().unwrap().day, today);

        assert!(daily_activity(&[], NaiveDate::MIN, 7).is_empty());
        assert_eq!(daily_activity(&[], NaiveDate::MIN, 1).len(), 1);
    }
}
