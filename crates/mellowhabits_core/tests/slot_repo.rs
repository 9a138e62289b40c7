use mellowhabits_core::db::open_db_in_memory;
use mellowhabits_core::{RepoError, SlotRepository, SqliteSlotRepository};
use rusqlite::Connection;

#[test]
fn write_read_and_overwrite_slot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::try_new(&conn).unwrap();

    assert_eq!(repo.read_slot("SavedHabits").unwrap(), None);

    repo.write_slot("SavedHabits", "[1]").unwrap();
    repo.write_slot("SavedHabits", "[2]").unwrap();
    assert_eq!(repo.read_slot("SavedHabits").unwrap().as_deref(), Some("[2]"));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_slots;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn slots_are_independent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::try_new(&conn).unwrap();

    repo.write_slot("a", "alpha").unwrap();
    repo.write_slot("b", "beta").unwrap();
    assert!(repo.remove_slot("a").unwrap());

    assert_eq!(repo.read_slot("a").unwrap(), None);
    assert_eq!(repo.read_slot("b").unwrap().as_deref(), Some("beta"));
}

#[test]
fn remove_missing_slot_is_not_an_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::try_new(&conn).unwrap();

    assert!(!repo.remove_slot("missing").unwrap());
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteSlotRepository::try_new(&conn)
        .err()
        .expect("unmigrated connection must be rejected");
    assert!(matches!(err, RepoError::Unavailable(_)));
}
