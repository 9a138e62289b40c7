use chrono::{TimeZone, Utc};
use mellowhabits_core::{celebration_reached, Habit, HabitKind, HabitValidationError};
use uuid::Uuid;

#[test]
fn habit_new_sets_defaults() {
    let habit = Habit::new("Read", "Morgens", None, 5);

    assert!(!habit.id().is_nil());
    assert_eq!(habit.title, "Read");
    assert_eq!(habit.time, "Morgens");
    assert_eq!(habit.icon, "star.fill");
    assert_eq!(habit.current_punches(), 0);
    assert_eq!(habit.total_goal(), 5);
    assert!(habit.punch_dates().is_empty());
    assert_eq!(habit.kind(), HabitKind::Punchcard);
    assert!(habit.validate().is_ok());
}

#[test]
fn celebration_threshold_examples() {
    let mut habit = Habit::new("Lesen", "Täglich", None, 10);
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 7, 0, 0).unwrap();
    for _ in 0..7 {
        habit.punch(at);
    }
    assert!(!habit.is_celebrated());

    habit.punch(at);
    assert!(habit.is_celebrated());
    assert_eq!(habit.progress(), 0.8);
    assert!(!habit.is_complete());

    assert!(!celebration_reached(10, 0));
}

#[test]
fn zero_goal_record_is_never_celebrated() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "title": "Kaputt",
        "time": "Nie",
        "icon": "tv",
        "currentPunches": 3,
        "totalGoal": 0,
        "punchDates": []
    });

    let habit: Habit = serde_json::from_value(value).unwrap();
    assert!(!habit.is_celebrated());
    assert_eq!(habit.progress(), 0.0);
    assert_eq!(habit.validate(), Err(HabitValidationError::ZeroGoal));
}

#[test]
fn punch_stops_at_goal() {
    let mut habit = Habit::new("Wasser", "Morgens", None, 2);
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 7, 0, 0).unwrap();

    assert!(habit.punch(at));
    assert!(habit.punch(at));
    assert!(!habit.punch(at));
    assert_eq!(habit.current_punches(), 2);
    assert_eq!(habit.punch_dates().len(), 2);
    assert!(habit.is_complete());
}

#[test]
fn toggle_on_then_off_restores_prior_state() {
    let mut habit = Habit::new("Yoga", "Abends", None, 1);
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 7, 0, 0).unwrap();

    assert!(habit.toggle(at));
    assert_eq!(habit.current_punches(), 1);
    assert_eq!(habit.punch_dates(), &[at]);

    assert!(!habit.toggle(at));
    assert_eq!(habit.current_punches(), 0);
    assert!(habit.punch_dates().is_empty());
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut habit = Habit::with_id(id, "Im Inventar kramen", "3x Woche", Some("archivebox.fill"), 10);
    habit.punch(Utc.with_ymd_and_hms(2026, 2, 13, 10, 0, 0).unwrap());

    let json = serde_json::to_value(&habit).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["title"], "Im Inventar kramen");
    assert_eq!(json["time"], "3x Woche");
    assert_eq!(json["icon"], "archivebox.fill");
    assert_eq!(json["currentPunches"], 1);
    assert_eq!(json["totalGoal"], 10);
    assert_eq!(json["punchDates"][0], "2026-02-13T10:00:00Z");

    let decoded: Habit = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, habit);
}

#[test]
fn validate_rejects_nil_id_and_excess_punches() {
    let habit = Habit::with_id(Uuid::nil(), "Read", "Morgens", None, 1);
    assert_eq!(habit.validate(), Err(HabitValidationError::NilId));

    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "title": "Read",
        "time": "Morgens",
        "icon": "book",
        "currentPunches": 6,
        "totalGoal": 5,
        "punchDates": []
    });
    let habit: Habit = serde_json::from_value(value).unwrap();
    assert_eq!(
        habit.validate(),
        Err(HabitValidationError::PunchesExceedGoal {
            current: 6,
            goal: 5
        })
    );
}

#[test]
fn validate_rejects_unordered_punch_dates() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "title": "Read",
        "time": "Morgens",
        "icon": "book",
        "currentPunches": 2,
        "totalGoal": 5,
        "punchDates": ["2026-02-13T10:00:00Z", "2026-02-12T10:00:00Z"]
    });
    let habit: Habit = serde_json::from_value(value).unwrap();

    assert_eq!(
        habit.validate(),
        Err(HabitValidationError::UnorderedPunchDates { index: 1 })
    );
}
