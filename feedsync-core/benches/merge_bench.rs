//! Criterion benchmarks for feedsync hot paths.
//!
//! Benchmarks:
//! 1. Merge of a small incremental fetch into a large dataset
//! 2. Full refetch merge (every incoming row overlaps)
//! 3. Date validation of a fetched page

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use feedsync_core::data::merge::merge;
use feedsync_core::data::validate::validate_records;
use feedsync_core::domain::{Dataset, Record};
use serde_json::json;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_rows(start: i64, n: usize) -> Vec<Record> {
    let base = chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    (0..n as i64)
        .map(|i| {
            let date = base + chrono::Duration::days(start + i);
            Record::from_value(json!({
                "Ngay": date.format("%d/%m/%Y").to_string(),
                "GiaDieuChinh": 10.0 + (i as f64 * 0.1).sin(),
                "GiaDongCua": 10.0 + (i as f64 * 0.1).cos(),
                "KhoiLuongKhopLenh": 1000 + i,
            }))
            .unwrap()
        })
        .collect()
}

fn bench_incremental_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_incremental");
    for size in [1_000usize, 5_000] {
        let existing = Dataset::from_rows(make_rows(0, size));
        let incoming = make_rows(size as i64 - 2, 20);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                black_box(merge(
                    existing.clone(),
                    incoming.clone(),
                    black_box("Ngay"),
                ))
            })
        });
    }
    group.finish();
}

fn bench_full_refetch_merge(c: &mut Criterion) {
    let existing = Dataset::from_rows(make_rows(0, 5_000));
    let incoming = make_rows(0, 5_000);
    c.bench_function("merge_full_refetch_5000", |b| {
        b.iter(|| black_box(merge(existing.clone(), incoming.clone(), "Ngay")))
    });
}

fn bench_validation(c: &mut Criterion) {
    let rows = make_rows(0, 5_000);
    c.bench_function("validate_5000", |b| {
        b.iter(|| black_box(validate_records(rows.clone(), "Ngay")))
    });
}

criterion_group!(
    benches,
    bench_incremental_merge,
    bench_full_refetch_merge,
    bench_validation
);
criterion_main!(benches);
