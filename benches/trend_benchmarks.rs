//! Benchmarks for the derived trend views.
//!
//! The trend and calendar views are recomputed from the full log on every
//! query, so their cost over a realistically large journal matters.

use std::hint::black_box;

use chrono::{Duration, NaiveDate, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use lumina::journal::{
    mark_window, recent_series, summary, CalendarWindow, EntryStore, JournalStorage,
    DEFAULT_SERIES_LEN,
};
use tempfile::TempDir;

/// Roughly three years of daily check-ins.
const LOG_SIZE: i64 = 1_000;

fn populated_store() -> (EntryStore, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let mut store = EntryStore::load(JournalStorage::new(dir.path().join("journal.json")));

    let start = Utc::now() - Duration::days(LOG_SIZE);
    for day in 0..LOG_SIZE {
        let score = (day % 5 + 1) as u8;
        store
            .append(score, "benchmark entry", start + Duration::days(day))
            .expect("append");
    }
    (store, dir)
}

fn bench_summary(c: &mut Criterion) {
    let (store, _dir) = populated_store();
    c.bench_function("summary_1k_entries", |b| {
        b.iter(|| black_box(summary(black_box(&store))));
    });
}

fn bench_recent_series(c: &mut Criterion) {
    let (store, _dir) = populated_store();
    c.bench_function("recent_series_14_of_1k", |b| {
        b.iter(|| black_box(recent_series(black_box(&store), DEFAULT_SERIES_LEN)));
    });
}

fn bench_month_grid(c: &mut Criterion) {
    let (store, _dir) = populated_store();
    let anchor = NaiveDate::from_ymd_opt(2025, 6, 15).expect("date");
    c.bench_function("month_grid_1k_entries", |b| {
        b.iter(|| {
            black_box(mark_window(
                black_box(&store),
                anchor,
                anchor,
                anchor,
                CalendarWindow::Month,
            ))
        });
    });
}

criterion_group!(benches, bench_summary, bench_recent_series, bench_month_grid);
criterion_main!(benches);
