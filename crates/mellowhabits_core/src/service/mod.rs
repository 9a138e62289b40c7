//! Core use-case services.
//!
//! # Responsibility
//! - Own the habit collection and route every mutation through one boundary.
//! - Derive read-only statistics for front ends.
//! - Keep front ends decoupled from slot storage details.

pub mod habit_store;
pub mod seed;
pub mod stats;
