//! Core domain logic for MellowHabits.
//! This crate is the single source of truth for habit state and its persistence.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{MigrationPolicy, SeedPolicy, StoreConfig, DEFAULT_SLOT_KEY};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::codec::{CodecError, MigrationError, MigrationReport};
pub use model::habit::{celebration_reached, Habit, HabitId, HabitKind, HabitValidationError};
pub use repo::memory_slot_repo::MemorySlotRepository;
pub use repo::slot_repo::{RepoError, RepoResult, SlotRepository, SqliteSlotRepository};
pub use service::habit_store::{
    AddOutcome, HabitStore, HabitUpdate, PunchOutcome, StoreError, StoreResult, ToggleOutcome,
    UpdateOutcome,
};
pub use service::stats::{ChecklistFilter, DayActivity, StatsSummary};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
