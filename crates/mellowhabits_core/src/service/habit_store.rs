//! Habit store: the single owner of habit state and its persistence.
//!
//! # Responsibility
//! - Hold the ordered habit collection (insertion order is display order).
//! - Apply add/punch/toggle/update/delete/clear and write through on each.
//! - Load the collection once at open time and seed samples per policy.
//!
//! # Invariants
//! - Every successful mutation is followed by exactly one full slot write.
//! - No-op mutations (punch at goal, unknown id) never write.
//! - A failed write keeps the in-memory change and the previous slot value.
//! - Punch state changes only through `Habit` methods.

use crate::config::{SeedPolicy, StoreConfig};
use crate::model::codec::{decode_habits, encode_habits, CodecError};
use crate::model::habit::{normalize_icon, Habit, HabitId, HabitValidationError};
use crate::repo::slot_repo::{RepoError, SlotRepository};
use crate::service::seed::sample_habits;
use chrono::Utc;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error.
#[derive(Debug)]
pub enum StoreError {
    /// Caller input would produce an invalid habit.
    Validation(HabitValidationError),
    /// Stored blob could not be encoded or decoded.
    Codec(CodecError),
    /// Slot storage failed.
    Storage(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "habit data could not be decoded: {err}"),
            Self::Storage(err) => write!(f, "habit data could not be persisted: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<HabitValidationError> for StoreError {
    fn from(value: HabitValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added(HabitId),
    /// A habit with the same title exists; nothing was inserted.
    DuplicateTitle(HabitId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunchOutcome {
    Punched { current: u32, goal: u32 },
    GoalReached,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    On,
    Off,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    DuplicateTitle(HabitId),
    NotFound,
}

/// Field changes for an existing habit; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitUpdate {
    pub title: Option<String>,
    pub time: Option<String>,
    pub icon: Option<String>,
    pub goal: Option<u32>,
    /// Applied after `goal`; clamped to the resulting goal.
    pub current_punches: Option<u32>,
}

/// Whether the slot existed when the store was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Absent,
    Loaded,
}

/// Owning container for all habit state.
///
/// Construct once per application run and pass it to whatever needs it.
pub struct HabitStore<R: SlotRepository> {
    repo: R,
    config: StoreConfig,
    habits: Vec<Habit>,
}

impl<R: SlotRepository> HabitStore<R> {
    /// Loads the configured slot and seeds samples per `config.seed`.
    ///
    /// # Errors
    /// - `StoreError::Codec` when the stored blob cannot be decoded.
    /// - `StoreError::Storage` when reading or the seeding write fails.
    pub fn open(repo: R, config: StoreConfig) -> StoreResult<Self> {
        let mut store = Self::empty(repo, config);
        let state = store.load()?;
        store.seed_if_needed(state)?;
        Ok(store)
    }

    /// Like [`HabitStore::open`], but never fails.
    ///
    /// On a load error the store starts empty, does not seed, and leaves the
    /// unreadable slot untouched until the first mutation overwrites it.
    /// The error, if any, is handed back to the caller.
    pub fn open_or_recover(repo: R, config: StoreConfig) -> (Self, Option<StoreError>) {
        let mut store = Self::empty(repo, config);
        let state = match store.load() {
            Ok(state) => state,
            Err(err) => {
                warn!(
                    "event=habit_store_open module=store status=recovered mode=empty error={err}"
                );
                return (store, Some(err));
            }
        };
        match store.seed_if_needed(state) {
            Ok(()) => (store, None),
            Err(err) => (store, Some(err)),
        }
    }

    fn empty(repo: R, config: StoreConfig) -> Self {
        Self {
            repo,
            config,
            habits: Vec::new(),
        }
    }

    fn load(&mut self) -> StoreResult<SlotState> {
        let key = self.config.slot_key.as_str();
        let blob = match self.repo.read_slot(key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                info!("event=habit_store_open module=store status=ok slot=absent");
                return Ok(SlotState::Absent);
            }
            Err(err) => {
                error!("event=habit_store_open module=store status=error error_code=slot_read_failed error={err}");
                return Err(err.into());
            }
        };

        match decode_habits(&blob, self.config.migration) {
            Ok((habits, _report)) => {
                info!(
                    "event=habit_store_open module=store status=ok slot=present count={}",
                    habits.len()
                );
                self.habits = habits;
                Ok(SlotState::Loaded)
            }
            Err(err) => {
                error!("event=habit_store_open module=store status=error error_code=decode_failed error={err}");
                Err(err.into())
            }
        }
    }

    fn seed_if_needed(&mut self, state: SlotState) -> StoreResult<()> {
        let seed = match self.config.seed {
            SeedPolicy::Never => false,
            SeedPolicy::WhenAbsent => state == SlotState::Absent,
            SeedPolicy::WhenEmpty => state == SlotState::Absent || self.habits.is_empty(),
        };
        if seed {
            self.seed_samples()?;
        }
        Ok(())
    }

    fn seed_samples(&mut self) -> StoreResult<()> {
        self.habits = sample_habits(Utc::now());
        info!(
            "event=habit_seed module=store status=ok count={}",
            self.habits.len()
        );
        self.save()
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id() == id)
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Gives the storage port back, e.g. to reopen a store over it.
    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Appends a new habit with zero punches.
    ///
    /// # Contract
    /// - Blank `icon` falls back to the default icon.
    /// - With `reject_duplicate_titles`, an existing title is a no-op.
    ///
    /// # Errors
    /// - `StoreError::Validation` for a blank title or zero goal.
    pub fn add_habit(
        &mut self,
        title: &str,
        time: &str,
        icon: Option<&str>,
        goal: u32,
    ) -> StoreResult<AddOutcome> {
        self.add_habit_with_punches(title, time, icon, goal, 0)
    }

    /// Like [`HabitStore::add_habit`], starting with `already_done` punches.
    ///
    /// `already_done` is clamped to `goal`; each starting punch is dated now.
    pub fn add_habit_with_punches(
        &mut self,
        title: &str,
        time: &str,
        icon: Option<&str>,
        goal: u32,
        already_done: u32,
    ) -> StoreResult<AddOutcome> {
        let title = title.trim();
        if self.config.reject_duplicate_titles {
            if let Some(existing) = self.find_by_title(title, None) {
                debug!("event=habit_add module=store status=skipped reason=duplicate_title existing={existing}");
                return Ok(AddOutcome::DuplicateTitle(existing));
            }
        }

        let mut habit = Habit::new(title, time.trim(), icon, goal);
        habit.validate()?;
        habit.set_punches(already_done, Utc::now());
        let id = habit.id();
        self.habits.push(habit);
        info!("event=habit_add module=store status=ok id={id} goal={goal}");
        self.save()?;
        Ok(AddOutcome::Added(id))
    }

    /// Records one punch when the habit is below its goal.
    pub fn add_punch(&mut self, id: HabitId) -> StoreResult<PunchOutcome> {
        let Some(habit) = self.habits.iter_mut().find(|habit| habit.id() == id) else {
            return Ok(PunchOutcome::NotFound);
        };
        if !habit.punch(Utc::now()) {
            return Ok(PunchOutcome::GoalReached);
        }
        let outcome = PunchOutcome::Punched {
            current: habit.current_punches(),
            goal: habit.total_goal(),
        };
        info!("event=habit_punch module=store status=ok id={id}");
        self.save()?;
        Ok(outcome)
    }

    /// Flips a checklist habit between done and not done.
    pub fn toggle_habit(&mut self, id: HabitId) -> StoreResult<ToggleOutcome> {
        let Some(habit) = self.habits.iter_mut().find(|habit| habit.id() == id) else {
            return Ok(ToggleOutcome::NotFound);
        };
        let outcome = if habit.toggle(Utc::now()) {
            ToggleOutcome::On
        } else {
            ToggleOutcome::Off
        };
        info!("event=habit_toggle module=store status=ok id={id} outcome={outcome:?}");
        self.save()?;
        Ok(outcome)
    }

    /// Edits title, schedule, icon, goal or progress of an existing habit.
    ///
    /// Lowering the goal clamps punches and drops the newest punch dates.
    /// `current_punches` is clamped to the (possibly new) goal; raising it
    /// dates the added punches now.
    ///
    /// # Errors
    /// - `StoreError::Validation` for a blank title or zero goal.
    pub fn update_habit(&mut self, id: HabitId, update: HabitUpdate) -> StoreResult<UpdateOutcome> {
        let Some(index) = self.position(id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if update.goal == Some(0) {
            return Err(HabitValidationError::ZeroGoal.into());
        }
        if let Some(title) = update.title.as_deref().map(str::trim) {
            if self.config.reject_duplicate_titles {
                if let Some(existing) = self.find_by_title(title, Some(id)) {
                    return Ok(UpdateOutcome::DuplicateTitle(existing));
                }
            }
        }

        let mut edited = self.habits[index].clone();
        if let Some(title) = update.title {
            edited.title = title.trim().to_string();
        }
        if let Some(time) = update.time {
            edited.time = time.trim().to_string();
        }
        if let Some(icon) = update.icon {
            edited.icon = normalize_icon(Some(icon.as_str()));
        }
        if let Some(goal) = update.goal {
            edited.set_goal(goal);
        }
        if let Some(punches) = update.current_punches {
            edited.set_punches(punches, Utc::now());
        }
        edited.validate()?;

        self.habits[index] = edited;
        info!("event=habit_update module=store status=ok id={id}");
        self.save()?;
        Ok(UpdateOutcome::Updated)
    }

    /// Removes a habit by id; returns `false` when no habit matched.
    pub fn delete_habit(&mut self, id: HabitId) -> StoreResult<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        self.habits.remove(index);
        info!("event=habit_delete module=store status=ok id={id}");
        self.save()?;
        Ok(true)
    }

    /// Removes the habit at display `position`.
    pub fn delete_habit_at(&mut self, position: usize) -> StoreResult<Option<HabitId>> {
        if position >= self.habits.len() {
            return Ok(None);
        }
        let id = self.habits.remove(position).id();
        info!("event=habit_delete module=store status=ok id={id} position={position}");
        self.save()?;
        Ok(Some(id))
    }

    /// Removes the habits at several display positions with a single write.
    ///
    /// Out-of-range and repeated positions are ignored. Returns the removed
    /// ids in display order; nothing is written when nothing matched.
    pub fn delete_habits_at(&mut self, positions: &[usize]) -> StoreResult<Vec<HabitId>> {
        let mut targets: Vec<usize> = positions
            .iter()
            .copied()
            .filter(|position| *position < self.habits.len())
            .collect();
        targets.sort_unstable();
        targets.dedup();
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let removed: Vec<HabitId> = targets.iter().map(|&index| self.habits[index].id()).collect();
        for &index in targets.iter().rev() {
            self.habits.remove(index);
        }
        info!(
            "event=habit_delete module=store status=ok count={}",
            removed.len()
        );
        self.save()?;
        Ok(removed)
    }

    /// Drops every habit and erases the slot, then reseeds if configured.
    pub fn clear_all_data(&mut self) -> StoreResult<()> {
        let count = self.habits.len();
        self.habits.clear();
        let removed = self
            .repo
            .remove_slot(&self.config.slot_key)
            .inspect_err(|err| {
                error!("event=habit_clear module=store status=error error_code=slot_remove_failed error={err}");
            })?;
        info!("event=habit_clear module=store status=ok count={count} slot_removed={removed}");

        if self.config.reseed_on_clear {
            self.seed_samples()?;
        }
        Ok(())
    }

    /// Writes the full collection to the configured slot.
    pub fn save(&self) -> StoreResult<()> {
        let blob = encode_habits(&self.habits).inspect_err(|err| {
            error!("event=habit_save module=store status=error error_code=encode_failed error={err}");
        })?;
        self.repo
            .write_slot(&self.config.slot_key, &blob)
            .inspect_err(|err| {
                error!("event=habit_save module=store status=error error_code=slot_write_failed error={err}");
            })?;
        debug!(
            "event=habit_save module=store status=ok count={}",
            self.habits.len()
        );
        Ok(())
    }

    fn position(&self, id: HabitId) -> Option<usize> {
        self.habits.iter().position(|habit| habit.id() == id)
    }

    fn find_by_title(&self, title: &str, exclude: Option<HabitId>) -> Option<HabitId> {
        self.habits
            .iter()
            .find(|habit| habit.title == title && Some(habit.id()) != exclude)
            .map(Habit::id)
    }
}
