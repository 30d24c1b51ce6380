//! Calendar views derived from the entry log.
//!
//! Pure functions only: cells are recomputed whenever the anchor or the
//! entry set changes, never cached or mutated in place.

use chrono::{Datelike, Days, NaiveDate};

use crate::journal::store::EntryStore;

/// Which calendar view to mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarWindow {
    /// A 21-day rolling strip centered one week before the anchor date.
    WeekStrip,
    /// The full calendar month containing the anchor date.
    Month,
}

/// One marked day in a calendar view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    /// The calendar day this cell represents.
    pub date: NaiveDate,
    /// Whether this cell is the current day.
    pub is_today: bool,
    /// Whether this cell is the currently selected day.
    pub is_selected: bool,
    /// Whether the journal has at least one entry attributed to this day.
    pub has_entry: bool,
}

/// Mark a calendar window against the entry log.
///
/// `None` cells are the leading placeholders that pad a month grid up to the
/// weekday offset (Sunday = 0) of the first of the month; no trailing
/// padding is produced. The week strip contains no placeholders.
#[must_use]
pub fn mark_window(
    store: &EntryStore,
    anchor: NaiveDate,
    selected: NaiveDate,
    today: NaiveDate,
    window: CalendarWindow,
) -> Vec<Option<DayCell>> {
    match window {
        CalendarWindow::WeekStrip => week_strip(store, anchor, selected, today),
        CalendarWindow::Month => month_grid(store, anchor, selected, today),
    }
}

/// 21 consecutive days centered on `anchor - 7 days`.
fn week_strip(
    store: &EntryStore,
    anchor: NaiveDate,
    selected: NaiveDate,
    today: NaiveDate,
) -> Vec<Option<DayCell>> {
    let start = anchor - Days::new(17);
    (0..21)
        .map(|offset| Some(cell(store, start + Days::new(offset), selected, today)))
        .collect()
}

/// Full month of `anchor`, left-padded to the weekday of the 1st.
fn month_grid(
    store: &EntryStore,
    anchor: NaiveDate,
    selected: NaiveDate,
    today: NaiveDate,
) -> Vec<Option<DayCell>> {
    // Day 1 always exists for a valid anchor.
    let first = anchor.with_day(1).unwrap_or(anchor);

    let padding = first.weekday().num_days_from_sunday() as usize;
    let mut cells: Vec<Option<DayCell>> = vec![None; padding];

    let mut day = first;
    while day.month() == anchor.month() {
        cells.push(Some(cell(store, day, selected, today)));
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    cells
}

fn cell(store: &EntryStore, date: NaiveDate, selected: NaiveDate, today: NaiveDate) -> DayCell {
    DayCell {
        date,
        is_today: date == today,
        is_selected: date == selected,
        has_entry: store.has_entry_on(date),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::journal::storage::JournalStorage;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store_with_entry_on(date: NaiveDate) -> (EntryStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let mut store = EntryStore::load(JournalStorage::new(dir.path().join("journal.json")));
        let noon = Utc
            .with_ymd_and_hms(date.year(), date.month(), date.day(), 12, 0, 0)
            .unwrap();
        store.append(3, "", noon).unwrap();
        (store, dir)
    }

    fn empty_store() -> (EntryStore, TempDir) {
        let dir = TempDir::new().unwrap();
        (
            EntryStore::load(JournalStorage::new(dir.path().join("journal.json"))),
            dir,
        )
    }

    #[test]
    fn test_week_strip_has_21_days_no_placeholders() {
        let (store, _dir) = empty_store();
        let anchor = NaiveDate::from_ymd_opt(2025, 6, 18).unwrap();
        let cells = mark_window(&store, anchor, anchor, anchor, CalendarWindow::WeekStrip);

        assert_eq!(cells.len(), 21);
        assert!(cells.iter().all(Option::is_some));
    }

    #[test]
    fn test_week_strip_is_centered_one_week_before_anchor() {
        let (store, _dir) = empty_store();
        let anchor = NaiveDate::from_ymd_opt(2025, 6, 18).unwrap();
        let cells = mark_window(&store, anchor, anchor, anchor, CalendarWindow::WeekStrip);

        let first = cells.first().unwrap().as_ref().unwrap();
        let last = cells.last().unwrap().as_ref().unwrap();
        let center = cells[10].as_ref().unwrap();

        assert_eq!(first.date, anchor - Days::new(17));
        assert_eq!(last.date, anchor + Days::new(3));
        assert_eq!(center.date, anchor - Days::new(7));
    }

    #[test]
    fn test_month_grid_pads_to_weekday_of_first() {
        let (store, _dir) = empty_store();
        // May 1, 2024 is a Wednesday: weekday index 3 from Sunday.
        let anchor = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let cells = mark_window(&store, anchor, anchor, anchor, CalendarWindow::Month);

        assert!(cells[..3].iter().all(Option::is_none));
        let day1 = cells[3].as_ref().unwrap();
        assert_eq!(day1.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        // 3 placeholders + 31 days, no trailing padding.
        assert_eq!(cells.len(), 34);
    }

    #[test]
    fn test_month_grid_no_padding_when_first_is_sunday() {
        let (store, _dir) = empty_store();
        // June 1, 2025 is a Sunday.
        let anchor = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let cells = mark_window(&store, anchor, anchor, anchor, CalendarWindow::Month);

        assert!(cells[0].is_some());
        assert_eq!(cells.len(), 30);
    }

    #[test]
    fn test_month_grid_february_leap_year() {
        let (store, _dir) = empty_store();
        let anchor = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();
        let cells = mark_window(&store, anchor, anchor, anchor, CalendarWindow::Month);

        let days = cells.iter().filter(|c| c.is_some()).count();
        assert_eq!(days, 29);
    }

    #[test]
    fn test_cells_carry_today_selected_and_entry_flags() {
        let entry_day = NaiveDate::from_ymd_opt(2025, 6, 5).unwrap();
        let (store, _dir) = store_with_entry_on(entry_day);

        let anchor = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let selected = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let cells = mark_window(&store, anchor, selected, today, CalendarWindow::Month);

        let find = |date: NaiveDate| {
            cells
                .iter()
                .flatten()
                .find(|c| c.date == date)
                .unwrap()
                .clone()
        };

        assert!(find(entry_day).has_entry);
        assert!(!find(entry_day).is_today);
        assert!(find(selected).is_selected);
        assert!(find(today).is_today);
        assert!(!find(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()).has_entry);
    }

    #[test]
    fn test_marking_reflects_store_changes_on_recompute() {
        let (mut store, _dir) = empty_store();
        let anchor = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();

        let before = mark_window(&store, anchor, anchor, anchor, CalendarWindow::WeekStrip);
        assert!(before.iter().flatten().all(|c| !c.has_entry));

        let noon = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        store.append(4, "", noon).unwrap();

        let after = mark_window(&store, anchor, anchor, anchor, CalendarWindow::WeekStrip);
        assert!(after.iter().flatten().any(|c| c.has_entry));
    }
}
