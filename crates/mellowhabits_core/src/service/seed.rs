//! Sample habits used on first launch and after a reset.

use crate::model::habit::Habit;
use chrono::{DateTime, Utc};

const CHECKLIST_SAMPLES: &[(&str, &str, &str)] = &[
    ("Pfanne im Wald suchen", "Morgens", "frying.pan"),
    ("Ein freundliches 'Hering!' rufen", "Mittags", "mouth"),
    ("Kohle? KOHLE!", "Abends", "bitcoinsign.circle"),
];

const PUNCHCARD_SAMPLES: &[(&str, &str, &str)] = &[
    ("Lurche grüßen", "Täglich", "lizard.fill"),
    ("Im Inventar kramen", "3x Woche", "archivebox.fill"),
    ("Schon GEZahlt?", "Unregelmäßig", "tv"),
];

const PUNCHCARD_GOAL: u32 = 10;
// Pre-punched so the statistics view has something to show.
const PREPUNCHED_TITLE: &str = "Lurche grüßen";
const PREPUNCHED_COUNT: u32 = 7;

/// Builds the fixed sample set: three checklist habits, then three punchcards.
pub fn sample_habits(now: DateTime<Utc>) -> Vec<Habit> {
    let checklist = CHECKLIST_SAMPLES
        .iter()
        .map(|(title, time, icon)| Habit::new(*title, *time, Some(*icon), 1));
    let punchcards = PUNCHCARD_SAMPLES
        .iter()
        .map(|(title, time, icon)| Habit::new(*title, *time, Some(*icon), PUNCHCARD_GOAL));

    checklist
        .chain(punchcards)
        .map(|mut habit| {
            if habit.title == PREPUNCHED_TITLE {
                for _ in 0..PREPUNCHED_COUNT {
                    habit.punch(now);
                }
            }
            habit
        })
        .collect()
}

/// Returns whether `habits` has exactly the sample titles, in sample order.
pub fn is_sample_set(habits: &[Habit]) -> bool {
    let expected = CHECKLIST_SAMPLES
        .iter()
        .chain(PUNCHCARD_SAMPLES)
        .map(|(title, _, _)| *title);
    habits.iter().map(|habit| habit.title.as_str()).eq(expected)
}
