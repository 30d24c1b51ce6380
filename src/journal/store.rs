//! The append-only mood entry store.
//!
//! This module provides:
//! - [`EntryStore`]: the in-memory log plus its persistence side effect
//! - [`AppendOutcome`] / [`Durability`]: logical success vs. durability
//!
//! The store is append-only: entries are never edited or deleted. Storage
//! order is most-recent-insertion-first (for display lists); every derived
//! view re-sorts by attributed timestamp before windowing, because entries
//! may be backdated.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{JournalError, StorageError};
use crate::journal::entry::{MoodEntry, MoodScore};
use crate::journal::storage::JournalStorage;

/// Result of a successful append.
///
/// The append itself cannot fail once the score validates; what can fail is
/// the durable write, reported here as data so callers can surface a
/// warning without losing the entry.
#[derive(Debug)]
pub struct AppendOutcome {
    /// The entry now present in the in-memory log.
    pub entry: MoodEntry,
    /// Whether the journal file write succeeded.
    pub durability: Durability,
}

/// Durability of the persistence side effect of an append.
#[derive(Debug)]
pub enum Durability {
    /// The journal file was written.
    Persisted,
    /// The write failed; the in-memory log remains authoritative for the
    /// rest of the process lifetime.
    WriteFailed(StorageError),
}

impl Durability {
    /// True when the entry reached disk.
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        matches!(self, Self::Persisted)
    }
}

/// The append-only entry log with write-through persistence.
#[derive(Debug)]
pub struct EntryStore {
    /// Most-recent-insertion-first.
    entries: Vec<MoodEntry>,
    storage: JournalStorage,
    version: u64,
}

impl EntryStore {
    /// Rehydrate the store from durable storage.
    ///
    /// A missing or corrupt journal file yields an empty store rather than
    /// an error; the journal is a best-effort local cache and the user must
    /// never be locked out of check-ins by a bad file.
    #[must_use]
    pub fn load(storage: JournalStorage) -> Self {
        let entries = match storage.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable journal, starting empty");
                Vec::new()
            }
        };
        tracing::info!(entries = entries.len(), "journal loaded");
        Self {
            entries,
            storage,
            version: 0,
        }
    }

    /// Validate and append a new check-in, then persist the whole log.
    ///
    /// The entry is inserted at the head of the in-memory log before the
    /// storage write; a write failure is reported in the outcome, not as an
    /// error, and the entry stays in memory either way.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::InvalidScore`] when `score` is outside 1-5;
    /// the log is not mutated in that case.
    pub fn append(
        &mut self,
        score: u8,
        note: impl Into<String>,
        attributed_at: DateTime<Utc>,
    ) -> Result<AppendOutcome, JournalError> {
        let score = MoodScore::try_from(score)?;
        let entry = MoodEntry::new(score, note, attributed_at);

        self.entries.insert(0, entry.clone());
        self.version += 1;

        let durability = match self.storage.save(&self.entries) {
            Ok(()) => Durability::Persisted,
            Err(e) => {
                tracing::warn!(error = %e, "journal write failed, keeping entry in memory");
                Durability::WriteFailed(e)
            }
        };

        tracing::debug!(
            id = %entry.id,
            score = entry.score.as_u8(),
            durable = durability.is_durable(),
            "entry appended"
        );
        Ok(AppendOutcome { entry, durability })
    }

    /// All entries in insertion order, most recent first. For display lists.
    #[must_use]
    pub fn all(&self) -> &[MoodEntry] {
        &self.entries
    }

    /// Entries with `timestamp` in `[start, end)`, ordered by timestamp
    /// ascending. For charting.
    #[must_use]
    pub fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<MoodEntry> {
        let mut window: Vec<MoodEntry> = self
            .entries
            .iter()
            .filter(|e| e.timestamp >= start && e.timestamp < end)
            .cloned()
            .collect();
        window.sort_by_key(|e| e.timestamp);
        window
    }

    /// The last `n` entries by attributed timestamp, ascending.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<MoodEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|e| e.timestamp);
        if sorted.len() > n {
            sorted.split_off(sorted.len() - n)
        } else {
            sorted
        }
    }

    /// Whether any entry is attributed to the given calendar day.
    #[must_use]
    pub fn has_entry_on(&self, date: NaiveDate) -> bool {
        self.entries
            .iter()
            .any(|e| e.timestamp.date_naive() == date)
    }

    /// Number of entries in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Monotonic counter bumped on every append. Derived views may use it
    /// as a cache key.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use tempfile::TempDir;
    use test_case::test_case;

    fn test_store() -> (EntryStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = JournalStorage::new(dir.path().join("journal.json"));
        (EntryStore::load(storage), dir)
    }

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn test_append_valid_score_adds_one_entry() {
        let (mut store, _dir) = test_store();
        let outcome = store.append(4, "walked outside", Utc::now()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].id, outcome.entry.id);
        assert_eq!(store.all()[0].score.as_u8(), 4);
        assert!(outcome.durability.is_durable());
    }

    #[test_case(0 ; "zero")]
    #[test_case(6 ; "six")]
    fn test_append_invalid_score_rejected_without_mutation(score: u8) {
        let (mut store, _dir) = test_store();
        store.append(3, "", Utc::now()).unwrap();

        let err = store.append(score, "bad", Utc::now()).unwrap_err();
        assert_eq!(err, JournalError::InvalidScore { score });
        assert_eq!(store.len(), 1);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_append_ids_are_unique() {
        let (mut store, _dir) = test_store();
        for score in 1..=5 {
            store.append(score, "", Utc::now()).unwrap();
        }
        let ids: HashSet<String> = store.all().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_all_is_most_recent_insertion_first() {
        let (mut store, _dir) = test_store();
        store.append(1, "first", at(1_000)).unwrap();
        store.append(2, "second", at(500)).unwrap();

        // Insertion order, not timestamp order.
        assert_eq!(store.all()[0].note, "second");
        assert_eq!(store.all()[1].note, "first");
    }

    #[test]
    fn test_in_range_is_timestamp_ascending_and_half_open() {
        let (mut store, _dir) = test_store();
        store.append(3, "c", at(3_000)).unwrap();
        store.append(1, "a", at(1_000)).unwrap();
        store.append(2, "b", at(2_000)).unwrap();

        let window = store.in_range(at(1_000), at(3_000));
        let notes: Vec<&str> = window.iter().map(|e| e.note.as_str()).collect();
        // End bound excluded, start included, sorted ascending.
        assert_eq!(notes, vec!["a", "b"]);
    }

    #[test]
    fn test_recent_returns_last_n_by_timestamp_ascending() {
        let (mut store, _dir) = test_store();
        // Backdated entry inserted last but attributed earliest.
        store.append(4, "newest", at(4_000)).unwrap();
        store.append(3, "middle", at(3_000)).unwrap();
        store.append(1, "oldest", at(1_000)).unwrap();

        let recent = store.recent(2);
        let notes: Vec<&str> = recent.iter().map(|e| e.note.as_str()).collect();
        assert_eq!(notes, vec!["middle", "newest"]);
    }

    #[test]
    fn test_recent_with_n_larger_than_log() {
        let (mut store, _dir) = test_store();
        store.append(3, "", at(1_000)).unwrap();
        assert_eq!(store.recent(14).len(), 1);
    }

    #[test]
    fn test_has_entry_on_matches_calendar_day() {
        let (mut store, _dir) = test_store();
        let noon = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        store.append(5, "", noon).unwrap();

        assert!(store.has_entry_on(noon.date_naive()));
        assert!(!store.has_entry_on(noon.date_naive().succ_opt().unwrap()));
    }

    #[test]
    fn test_rehydration_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.json");

        let mut store = EntryStore::load(JournalStorage::new(&path));
        store.append(2, "one", at(1_000)).unwrap();
        store.append(4, "two", at(2_000)).unwrap();
        let before: Vec<MoodEntry> = store.all().to_vec();
        drop(store);

        let reloaded = EntryStore::load(JournalStorage::new(&path));
        assert_eq!(reloaded.all(), before.as_slice());
    }

    #[test]
    fn test_rehydration_swallows_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.json");
        std::fs::write(&path, b"\xff\xfenot json at all").unwrap();

        let store = EntryStore::load(JournalStorage::new(&path));
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_survives_unwritable_storage() {
        let dir = TempDir::new().unwrap();
        // A directory at the journal path makes the rename fail.
        let path = dir.path().join("journal.json");
        std::fs::create_dir_all(&path).unwrap();

        let mut store = EntryStore::load(JournalStorage::new(&path));
        let outcome = store.append(3, "still counts", Utc::now()).unwrap();

        assert!(!outcome.durability.is_durable());
        assert!(matches!(
            outcome.durability,
            Durability::WriteFailed(StorageError::WriteFailed { .. })
        ));
        // In-memory state is the source of truth.
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_version_counts_appends() {
        let (mut store, _dir) = test_store();
        assert_eq!(store.version(), 0);
        store.append(3, "", Utc::now()).unwrap();
        store.append(4, "", Utc::now()).unwrap();
        assert_eq!(store.version(), 2);
    }

    proptest! {
        #[test]
        fn prop_append_valid_scores_always_unique_ids(scores in proptest::collection::vec(1..=5u8, 1..40)) {
            let (mut store, _dir) = test_store();
            for score in &scores {
                store.append(*score, "", Utc::now()).unwrap();
            }
            let ids: HashSet<String> = store.all().iter().map(|e| e.id.clone()).collect();
            prop_assert_eq!(ids.len(), scores.len());
            prop_assert_eq!(store.len(), scores.len());
        }
    }
}
