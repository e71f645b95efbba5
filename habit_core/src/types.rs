//! Shared data types for HabitFlow.
//!
//! This module defines the shapes that cross the engine boundary:
//! - Display details the screens attach to a habit
//! - Persisted habit records (the JSON blob form)
//! - Per-habit status summaries

use crate::{CalendarDay, StreakPolicy};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EMOJI: &str = "⭐";
pub const DEFAULT_FREQUENCY: &str = "Daily";

// ============================================================================
// Display
// ============================================================================

/// Presentation-only details of a habit; the streak engine never reads these
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitDisplay {
    #[serde(default = "default_emoji")]
    pub emoji: String,
    #[serde(default = "default_frequency")]
    pub frequency: String,
}

impl Default for HabitDisplay {
    fn default() -> Self {
        Self {
            emoji: default_emoji(),
            frequency: default_frequency(),
        }
    }
}

impl HabitDisplay {
    /// Build display details, falling back to defaults for blank input
    pub fn new(emoji: Option<String>, frequency: Option<String>) -> Self {
        let pick = |value: Option<String>, fallback: fn() -> String| {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(fallback)
        };
        Self {
            emoji: pick(emoji, default_emoji),
            frequency: pick(frequency, default_frequency),
        }
    }
}

fn default_emoji() -> String {
    DEFAULT_EMOJI.into()
}

fn default_frequency() -> String {
    DEFAULT_FREQUENCY.into()
}

// ============================================================================
// Persistence
// ============================================================================

/// One habit as stored in the `habits` blob
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HabitRecord {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub display: HabitDisplay,
    #[serde(default)]
    pub policy: StreakPolicy,
    #[serde(default)]
    pub completions: Vec<CalendarDay>,
}

impl HabitRecord {
    /// Decode the entries of a `habits` blob one by one.
    ///
    /// An entry that does not decode (impossible date, negative budget,
    /// missing title) is logged and dropped; the rest still load.
    pub fn from_values(values: Vec<serde_json::Value>) -> Vec<HabitRecord> {
        values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping unreadable habit record #{}: {}", index, e);
                    None
                }
            })
            .collect()
    }
}

// ============================================================================
// Status
// ============================================================================

/// Everything a habit list row needs, evaluated at one instant
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HabitStatus {
    pub id: String,
    pub title: String,
    pub emoji: String,
    pub frequency: String,
    pub streak: u32,
    pub broken: bool,
    pub completed_today: bool,
    pub total_completions: usize,
    pub last_completed: Option<CalendarDay>,
}
