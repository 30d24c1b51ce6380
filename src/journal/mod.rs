//! The mood journal domain.
//!
//! This module provides:
//! - The entry data model and validated 1-5 score scale
//! - The append-only [`EntryStore`] with write-through JSON persistence
//! - Derived calendar and trend views, recomputed per query
//!
//! All derived views are pure functions of the current store snapshot;
//! nothing in this module keeps a separately-mutated aggregate.

mod calendar;
mod entry;
mod storage;
mod store;
mod trends;

pub use calendar::{mark_window, CalendarWindow, DayCell};
pub use entry::{MoodEntry, MoodScore};
pub use storage::JournalStorage;
pub use store::{AppendOutcome, Durability, EntryStore};
pub use trends::{
    recent_series, summary, TrendPoint, TrendSummary, DEFAULT_SERIES_LEN, INSIGHT_WINDOW_LEN,
};
