#![forbid(unsafe_code)]

//! Core domain model and business logic for HabitFlow.
//!
//! This crate provides:
//! - Calendar-day normalization and an injectable clock
//! - Habit registry with per-habit completion sets
//! - Streak calculation under a missed-day tolerance policy
//! - The owned `HabitTracker` facade with documented fallbacks
//! - To-do list
//! - JSON blob persistence, configuration and logging

pub mod types;
pub mod error;
pub mod calendar;
pub mod completion;
pub mod habit;
pub mod streak;
pub mod tracker;
pub mod todo;
pub mod storage;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use calendar::{CalendarDay, Clock, FixedClock, SystemClock};
pub use completion::CompletionSet;
pub use habit::{Habit, HabitStore, StreakPolicy};
pub use streak::{current_streak, is_streak_broken, StreakReport};
pub use tracker::HabitTracker;
pub use todo::{Todo, TodoList};
pub use storage::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use config::Config;
