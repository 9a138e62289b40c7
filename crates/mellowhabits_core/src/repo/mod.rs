//! Key-value slot persistence.
//!
//! # Responsibility
//! - Define the storage port the habit store writes through.
//! - Isolate SQLite query details from store orchestration.
//!
//! # Invariants
//! - A slot holds one opaque string; callers own its encoding.
//! - Writes replace the whole slot value.

pub mod memory_slot_repo;
pub mod slot_repo;
