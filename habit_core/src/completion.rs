//! Per-habit set of completed calendar days.

use crate::CalendarDay;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ascending, duplicate-free collection of completion days
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionSet {
    days: BTreeSet<CalendarDay>,
}

impl CompletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a day. Returns false if it was already present.
    pub fn insert(&mut self, day: CalendarDay) -> bool {
        self.days.insert(day)
    }

    /// Remove a day. Returns false if it was not present.
    pub fn remove(&mut self, day: CalendarDay) -> bool {
        self.days.remove(&day)
    }

    pub fn contains(&self, day: CalendarDay) -> bool {
        self.days.contains(&day)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Days in ascending order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = CalendarDay> + '_ {
        self.days.iter().copied()
    }

    pub fn first(&self) -> Option<CalendarDay> {
        self.days.first().copied()
    }

    pub fn last(&self) -> Option<CalendarDay> {
        self.days.last().copied()
    }

    /// Most recent completion on or before `day`
    pub fn latest_on_or_before(&self, day: CalendarDay) -> Option<CalendarDay> {
        self.days.range(..=day).next_back().copied()
    }

    /// Days up to and including `day`, ascending
    pub fn iter_through(
        &self,
        day: CalendarDay,
    ) -> impl DoubleEndedIterator<Item = CalendarDay> + '_ {
        self.days.range(..=day).copied()
    }
}

impl FromIterator<CalendarDay> for CompletionSet {
    fn from_iter<I: IntoIterator<Item = CalendarDay>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CompletionSet {
    type Item = CalendarDay;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, CalendarDay>>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter().copied()
    }
}
