//! In-memory slot repository.
//!
//! Used by tests and embedders that want an ephemeral store. Writes can be
//! made to fail on demand to exercise persistence error paths.

use super::slot_repo::{RepoError, RepoResult, SlotRepository};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemorySlotRepository {
    slots: RefCell<BTreeMap<String, String>>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemorySlotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `value` already stored under `key`.
    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let repo = Self::default();
        repo.slots.borrow_mut().insert(key.into(), value.into());
        repo
    }

    /// Makes subsequent `write_slot`/`remove_slot` calls fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.borrow().contains_key(key)
    }

    fn check_writable(&self) -> RepoResult<()> {
        if self.fail_writes.get() {
            return Err(RepoError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl SlotRepository for MemorySlotRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        self.check_writable()?;
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove_slot(&self, key: &str) -> RepoResult<bool> {
        self.check_writable()?;
        Ok(self.slots.borrow_mut().remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::MemorySlotRepository;
    use crate::repo::slot_repo::{RepoError, SlotRepository};

    #[test]
    fn failed_write_keeps_previous_value() {
        let repo = MemorySlotRepository::with_slot("k", "old");
        repo.set_fail_writes(true);

        let err = repo.write_slot("k", "new").unwrap_err();
        assert!(matches!(err, RepoError::Unavailable(_)));
        assert_eq!(repo.read_slot("k").unwrap().as_deref(), Some("old"));
        assert_eq!(repo.write_count(), 0);
    }

    #[test]
    fn remove_reports_presence() {
        let repo = MemorySlotRepository::with_slot("k", "v");
        assert!(repo.remove_slot("k").unwrap());
        assert!(!repo.remove_slot("k").unwrap());
        assert!(!repo.contains("k"));
    }
}
