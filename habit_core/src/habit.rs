//! Habit records and the registry that owns them.
//!
//! The [`HabitStore`] is an ordinary owned value; whoever creates it decides
//! how long it lives and who may touch it. It performs no I/O.

use crate::{CalendarDay, CompletionSet, Error, Result};
use serde::{Deserialize, Serialize};

/// Missed-day tolerance for a habit's streak
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakPolicy {
    #[serde(default)]
    pub allow_missed_days: bool,
    #[serde(default)]
    pub max_missed_days: u32,
}

impl StreakPolicy {
    /// Every calendar day must be completed
    pub const STRICT: StreakPolicy = StreakPolicy {
        allow_missed_days: false,
        max_missed_days: 0,
    };

    /// Tolerate up to `max_missed_days` gap days across the whole run
    pub fn tolerant(max_missed_days: u32) -> Self {
        Self {
            allow_missed_days: true,
            max_missed_days,
        }
    }

    /// Number of missing days a single run may absorb
    pub fn missed_day_budget(&self) -> u32 {
        if self.allow_missed_days {
            self.max_missed_days
        } else {
            0
        }
    }
}

/// A tracked habit and its completion history
#[derive(Clone, Debug)]
pub struct Habit {
    id: String,
    title: String,
    policy: StreakPolicy,
    completions: CompletionSet,
}

impl Habit {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn policy(&self) -> StreakPolicy {
        self.policy
    }

    pub fn completions(&self) -> &CompletionSet {
        &self.completions
    }
}

/// Registry of habits, iterated in insertion order
#[derive(Clone, Debug, Default)]
pub struct HabitStore {
    habits: Vec<Habit>,
}

impl HabitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new habit with an empty completion set
    pub fn create_habit(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        policy: StreakPolicy,
    ) -> Result<&Habit> {
        let id = id.into();
        let title = title.into();

        if id.trim().is_empty() {
            return Err(Error::InvalidArgument("habit id must not be empty".into()));
        }
        if title.trim().is_empty() {
            return Err(Error::InvalidArgument(format!(
                "title for habit {} must not be empty",
                id
            )));
        }
        if self.position(&id).is_some() {
            return Err(Error::AlreadyExists(id));
        }

        tracing::debug!("Creating habit {} ({:?})", id, policy);
        self.habits.push(Habit {
            id,
            title,
            policy,
            completions: CompletionSet::new(),
        });

        self.habits
            .last()
            .ok_or_else(|| Error::NotFound("newly created habit".into()))
    }

    pub fn get_habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// Remove a habit together with its completions
    pub fn delete_habit(&mut self, id: &str) -> Result<Habit> {
        let idx = self
            .position(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        tracing::debug!("Deleting habit {}", id);
        Ok(self.habits.remove(idx))
    }

    pub fn all_habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// Record a completion day. Returns whether the set changed.
    pub fn add_completion(&mut self, id: &str, day: CalendarDay) -> Result<bool> {
        let habit = self.habit_mut(id)?;
        let changed = habit.completions.insert(day);
        tracing::debug!("Add completion {} for {}: changed={}", day, id, changed);
        Ok(changed)
    }

    /// Drop a completion day. Returns whether a removal occurred.
    pub fn remove_completion(&mut self, id: &str, day: CalendarDay) -> Result<bool> {
        let habit = self.habit_mut(id)?;
        let changed = habit.completions.remove(day);
        tracing::debug!("Remove completion {} for {}: changed={}", day, id, changed);
        Ok(changed)
    }

    pub fn completions(&self, id: &str) -> Result<&CompletionSet> {
        self.get_habit(id)
            .map(Habit::completions)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.habits.iter().position(|h| h.id == id)
    }

    fn habit_mut(&mut self, id: &str) -> Result<&mut Habit> {
        self.habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }
}
