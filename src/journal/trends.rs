//! Trend statistics derived from the entry log.
//!
//! Pure functions over a store snapshot, recomputed on every query. There is
//! no incrementally-maintained aggregate that could drift from the log; the
//! store's version counter is available to callers that want to memoize.

use crate::journal::store::EntryStore;

/// Number of points the mood chart tracks.
pub const DEFAULT_SERIES_LEN: usize = 14;

/// Number of entries sent to the insight service.
pub const INSIGHT_WINDOW_LEN: usize = 7;

/// One charted point: a short date label and the score at that check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    /// Short date label, e.g. `"Mar 14"`.
    pub date_label: String,
    /// Score on the 1-5 scale.
    pub score: u8,
}

/// Whole-log summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSummary {
    /// Total number of entries.
    pub count: usize,
    /// Mean score rounded to one decimal, or `None` for an empty log.
    pub average: Option<f64>,
}

/// The last `n` entries by attributed timestamp, ascending, as chart points.
///
/// Used for charting only; averages always run over the whole log.
#[must_use]
pub fn recent_series(store: &EntryStore, n: usize) -> Vec<TrendPoint> {
    store
        .recent(n)
        .iter()
        .map(|e| TrendPoint {
            date_label: e.timestamp.format("%b %-d").to_string(),
            score: e.score.as_u8(),
        })
        .collect()
}

/// Entry count and mean score over the whole log.
///
/// Never divides by zero: an empty log yields `average: None`.
#[must_use]
pub fn summary(store: &EntryStore) -> TrendSummary {
    let count = store.len();
    if count == 0 {
        return TrendSummary {
            count: 0,
            average: None,
        };
    }

    let sum: u32 = store.all().iter().map(|e| u32::from(e.score.as_u8())).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = f64::from(sum) / count as f64;
    TrendSummary {
        count,
        average: Some((mean * 10.0).round() / 10.0),
    }
}
