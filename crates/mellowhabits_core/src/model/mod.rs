//! Habit domain model and its persisted representation.
//!
//! # Responsibility
//! - Define the habit record and the invariants on its punch state.
//! - Own the JSON shape of the habit slot, including legacy upgrades.
//!
//! # Invariants
//! - Every habit is identified by a stable `HabitId`.
//! - Punch counters change only through `Habit` methods.

pub mod codec;
pub mod habit;
