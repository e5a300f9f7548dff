//! Benchmarks for dataset consolidation and derived views
//!
//! Run with: cargo bench

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use fluxvis_rs::types::{ConsolidatedDataset, FieldValue, SampleRecord};
use fluxvis_rs::views::{infer_parameter_columns, plot_points, series_for, summarize};

/// Build `count` samples spread over `devices` devices at a 60s cadence
fn make_samples(count: usize, devices: usize) -> Vec<SampleRecord> {
    let start = Utc.with_ymd_and_hms(2025, 10, 22, 6, 17, 0).unwrap();
    (0..count)
        .map(|i| {
            let device = format!("satellite-{}", i % devices + 1);
            let time = start + ChronoDuration::seconds((i / devices) as i64 * 60);
            SampleRecord::new(device, time)
                .with_field("temperature", FieldValue::Number(20.0 + (i as f64).sin()))
                .with_field("batteryVoltage", FieldValue::Number(3.7))
                .with_field("counter", FieldValue::Number(i as f64))
                .with_field("hall", FieldValue::Flag(i % 7 == 0))
        })
        .collect()
}

fn bench_from_unsorted(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_unsorted");

    for size in [1000, 10_000, 100_000].iter() {
        let samples = make_samples(*size, 5);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("build", size), &samples, |b, samples| {
            b.iter(|| black_box(ConsolidatedDataset::from_unsorted(samples.clone())));
        });
    }

    group.finish();
}

fn bench_incremental_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental_merge");

    for size in [10_000, 100_000].iter() {
        let dataset = ConsolidatedDataset::from_unsorted(make_samples(*size, 5));

        // A typical poll delta: one new tick per device plus the re-fetched
        // boundary records
        let mut delta = make_samples(10, 5);
        let watermark = dataset.watermark().unwrap();
        for (i, record) in delta.iter_mut().enumerate() {
            record.time = watermark + ChronoDuration::seconds((i / 5) as i64 * 60);
        }

        group.throughput(Throughput::Elements(delta.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("small_delta", size),
            &(dataset, delta),
            |b, (dataset, delta)| {
                b.iter(|| black_box(dataset.merge(delta.clone())));
            },
        );
    }

    group.finish();
}

fn bench_views(c: &mut Criterion) {
    let mut group = c.benchmark_group("views");

    for size in [10_000, 100_000].iter() {
        let dataset = ConsolidatedDataset::from_unsorted(make_samples(*size, 5));

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("summarize", size), &dataset, |b, ds| {
            b.iter(|| black_box(summarize(ds)));
        });

        group.bench_with_input(BenchmarkId::new("series_for", size), &dataset, |b, ds| {
            b.iter(|| black_box(series_for(ds, "satellite-3")));
        });

        let series = series_for(&dataset, "satellite-3");
        group.bench_with_input(
            BenchmarkId::new("plot_points", size),
            &series,
            |b, series| {
                b.iter(|| black_box(plot_points(series, "temperature")));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("infer_columns", size),
            &series,
            |b, series| {
                b.iter(|| black_box(infer_parameter_columns(series)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_from_unsorted,
    bench_incremental_merge,
    bench_views,
);

criterion_main!(benches);
