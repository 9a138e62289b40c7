//! Store configuration.
//!
//! Deserializable so front ends can read it from a TOML file; every field
//! has a default, so an empty document yields `StoreConfig::default()`.

use serde::{Deserialize, Serialize};

/// Slot key used when none is configured.
pub const DEFAULT_SLOT_KEY: &str = "SavedHabits";

/// When the store seeds the sample habits at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Never seed.
    Never,
    /// Seed only when the slot does not exist.
    WhenAbsent,
    /// Seed when the slot does not exist or holds an empty collection.
    #[default]
    WhenEmpty,
}

/// How stored records missing newer fields are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationPolicy {
    /// Fill `icon` and `punchDates` with defaults.
    #[default]
    FillDefaults,
    /// Fail the load on any missing field.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub slot_key: String,
    pub seed: SeedPolicy,
    pub reseed_on_clear: bool,
    pub reject_duplicate_titles: bool,
    pub migration: MigrationPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            seed: SeedPolicy::default(),
            reseed_on_clear: true,
            reject_duplicate_titles: true,
            migration: MigrationPolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Configuration for tests and embedders that want an empty start.
    pub fn without_seeding() -> Self {
        Self {
            seed: SeedPolicy::Never,
            reseed_on_clear: false,
            ..Self::default()
        }
    }
}
