//! Owned habit tracker: the store, an evaluation clock and a reference zone.
//!
//! Callers construct a [`HabitTracker`] once, apply incremental operations
//! to it, and ask it for streaks. Instants passed in are normalized to
//! [`CalendarDay`]s in the tracker's reference zone; streak queries are
//! evaluated at the clock's current day.
//!
//! ## Fallbacks
//!
//! The `*_or_*` methods are the canonical degraded answers for a caller that
//! must not fail (a list row, a badge). They log the underlying error and
//! never modify state on the failing path:
//!
//! | method                      | on error |
//! |-----------------------------|----------|
//! | `streak_or_zero`            | `0`      |
//! | `is_broken_or_true`         | `true`   |
//! | `completions_or_empty`      | `[]`     |
//! | `add_completion_or_skip`    | `false`  |
//! | `remove_completion_or_skip` | `false`  |

use crate::{
    streak, CalendarDay, Clock, CompletionSet, Error, Habit, HabitDisplay, HabitRecord,
    HabitStatus, HabitStore, Result, StreakPolicy, SystemClock,
};
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::HashMap;

pub struct HabitTracker<C: Clock = SystemClock> {
    store: HabitStore,
    display: HashMap<String, HabitDisplay>,
    clock: C,
    zone: FixedOffset,
}

impl<C: Clock> HabitTracker<C> {
    pub fn new(clock: C, zone: FixedOffset) -> Self {
        Self {
            store: HabitStore::new(),
            display: HashMap::new(),
            clock,
            zone,
        }
    }

    /// Rebuild a tracker from persisted records
    ///
    /// Records that cannot be registered (blank id or title, duplicate id)
    /// are logged and skipped so one bad entry does not hide the others.
    pub fn from_records(records: Vec<HabitRecord>, clock: C, zone: FixedOffset) -> Self {
        let mut tracker = Self::new(clock, zone);

        for record in records {
            let id = record.id.clone();
            let created = tracker.create_habit_with_display(
                record.id,
                record.title,
                record.policy,
                record.display,
            );
            if let Err(e) = created {
                tracing::warn!("Skipping stored habit {:?}: {}", id, e);
                continue;
            }
            for day in record.completions {
                // The habit was registered just above
                let _ = tracker.store.add_completion(&id, day);
            }
        }

        tracing::info!("Loaded {} habits", tracker.store.len());
        tracker
    }

    /// Snapshot every habit as a persistable record, in insertion order
    pub fn to_records(&self) -> Vec<HabitRecord> {
        self.store
            .all_habits()
            .iter()
            .map(|habit| HabitRecord {
                id: habit.id().to_string(),
                title: habit.title().to_string(),
                display: self.display.get(habit.id()).cloned().unwrap_or_default(),
                policy: habit.policy(),
                completions: habit.completions().iter().collect(),
            })
            .collect()
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// The evaluation day
    pub fn today(&self) -> CalendarDay {
        self.day_of(self.clock.now())
    }

    pub fn day_of(&self, instant: DateTime<Utc>) -> CalendarDay {
        CalendarDay::from_instant(instant, &self.zone)
    }

    // ------------------------------------------------------------------
    // Habits
    // ------------------------------------------------------------------

    pub fn create_habit(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        policy: StreakPolicy,
    ) -> Result<&Habit> {
        self.create_habit_with_display(id, title, policy, HabitDisplay::default())
    }

    pub fn create_habit_with_display(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        policy: StreakPolicy,
        display: HabitDisplay,
    ) -> Result<&Habit> {
        let id = id.into();
        self.store.create_habit(id.clone(), title, policy)?;
        self.display.insert(id.clone(), display);
        tracing::info!("Created habit {}", id);
        self.store
            .get_habit(&id)
            .ok_or_else(|| Error::NotFound(id.clone()))
    }

    pub fn get_habit(&self, id: &str) -> Option<&Habit> {
        self.store.get_habit(id)
    }

    pub fn delete_habit(&mut self, id: &str) -> Result<()> {
        self.store.delete_habit(id)?;
        self.display.remove(id);
        tracing::info!("Deleted habit {}", id);
        Ok(())
    }

    pub fn all_habits(&self) -> &[Habit] {
        self.store.all_habits()
    }

    pub fn display(&self, id: &str) -> Option<&HabitDisplay> {
        self.display.get(id)
    }

    /// Change the emoji and frequency label shown for a habit
    pub fn update_display(&mut self, id: &str, display: HabitDisplay) -> Result<()> {
        if self.store.get_habit(id).is_none() {
            return Err(Error::NotFound(id.to_string()));
        }
        self.display.insert(id.to_string(), display);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Completions
    // ------------------------------------------------------------------

    /// Record that the habit was done at `instant`. Returns whether the
    /// completion set changed.
    pub fn add_completion(&mut self, id: &str, instant: DateTime<Utc>) -> Result<bool> {
        let day = self.day_of(instant);
        self.store.add_completion(id, day)
    }

    /// Un-record the completion on `instant`'s day. Returns whether one was
    /// removed.
    pub fn remove_completion(&mut self, id: &str, instant: DateTime<Utc>) -> Result<bool> {
        let day = self.day_of(instant);
        self.store.remove_completion(id, day)
    }

    /// Completion days in ascending order
    pub fn completions(&self, id: &str) -> Result<&CompletionSet> {
        self.store.completions(id)
    }

    pub fn is_completed_today(&self, id: &str) -> Result<bool> {
        let today = self.today();
        Ok(self.store.completions(id)?.contains(today))
    }

    // ------------------------------------------------------------------
    // Streaks
    // ------------------------------------------------------------------

    pub fn current_streak(&self, id: &str) -> Result<u32> {
        let habit = self.require(id)?;
        Ok(streak::current_streak(
            habit.completions(),
            habit.policy(),
            self.today(),
        ))
    }

    pub fn is_streak_broken(&self, id: &str) -> Result<bool> {
        let habit = self.require(id)?;
        Ok(streak::is_streak_broken(
            habit.completions(),
            habit.policy(),
            self.today(),
        ))
    }

    /// Row summary for one habit
    pub fn status(&self, id: &str) -> Result<HabitStatus> {
        let habit = self.require(id)?;
        Ok(self.status_of(habit, self.today()))
    }

    /// Row summaries for every habit, in insertion order
    pub fn statuses(&self) -> Vec<HabitStatus> {
        let today = self.today();
        self.store
            .all_habits()
            .iter()
            .map(|habit| self.status_of(habit, today))
            .collect()
    }

    // ------------------------------------------------------------------
    // Fallbacks
    // ------------------------------------------------------------------

    pub fn streak_or_zero(&self, id: &str) -> u32 {
        self.current_streak(id).unwrap_or_else(|e| {
            tracing::warn!("Error getting streak for {}: {}", id, e);
            0
        })
    }

    pub fn is_broken_or_true(&self, id: &str) -> bool {
        self.is_streak_broken(id).unwrap_or_else(|e| {
            tracing::warn!("Error checking streak for {}: {}", id, e);
            true
        })
    }

    pub fn completions_or_empty(&self, id: &str) -> Vec<CalendarDay> {
        match self.completions(id) {
            Ok(set) => set.iter().collect(),
            Err(e) => {
                tracing::warn!("Error getting completions for {}: {}", id, e);
                Vec::new()
            }
        }
    }

    pub fn add_completion_or_skip(&mut self, id: &str, instant: DateTime<Utc>) -> bool {
        self.add_completion(id, instant).unwrap_or_else(|e| {
            tracing::warn!("Error adding completion for {}: {}", id, e);
            false
        })
    }

    pub fn remove_completion_or_skip(&mut self, id: &str, instant: DateTime<Utc>) -> bool {
        self.remove_completion(id, instant).unwrap_or_else(|e| {
            tracing::warn!("Error removing completion for {}: {}", id, e);
            false
        })
    }

    fn require(&self, id: &str) -> Result<&Habit> {
        self.store
            .get_habit(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn status_of(&self, habit: &Habit, today: CalendarDay) -> HabitStatus {
        let report = streak::evaluate(habit.completions(), habit.policy(), today);
        let display = self.display.get(habit.id()).cloned().unwrap_or_default();

        HabitStatus {
            id: habit.id().to_string(),
            title: habit.title().to_string(),
            emoji: display.emoji,
            frequency: display.frequency,
            streak: report.current,
            broken: report.broken,
            completed_today: habit.completions().contains(today),
            total_completions: habit.completions().len(),
            last_completed: habit.completions().latest_on_or_before(today),
        }
    }
}

impl HabitTracker<SystemClock> {
    /// Tracker evaluating at wall-clock time
    pub fn with_system_clock(zone: FixedOffset) -> Self {
        Self::new(SystemClock, zone)
    }
}
