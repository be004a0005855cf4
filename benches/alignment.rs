use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use chrono_tz::Europe::Amsterdam;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use solar_dataset::{
    Aggregation, HourlyAligner, Sample, SeriesJoiner, SolarGeometryFeature, SpaSolarPosition, TimeSeries,
};

fn quarter_hours(days: i64) -> Vec<Sample> {
    let start = NaiveDate::from_ymd_opt(2019, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    (0..days * 96)
        .map(|i| Sample::new(start + TimeDelta::minutes(15 * i), (i % 400) as f64))
        .collect()
}

fn hourly(days: i64, offset: f64) -> TimeSeries {
    let start = DateTime::<Utc>::from_timestamp(1_546_300_800, 0).unwrap_or_default();
    (0..days * 24)
        .map(|i| (start + TimeDelta::hours(i), i as f64 + offset))
        .collect()
}

fn bench_alignment(c: &mut Criterion) {
    let aligner = HourlyAligner::default();
    let samples = quarter_hours(365);
    c.bench_function("align_year_of_quarter_hours", |b| {
        b.iter(|| aligner.align_samples(black_box(&samples), Aggregation::Sum, Amsterdam))
    });

    let energy = hourly(365, 0.0);
    let temperature = hourly(365, 0.5);
    let clouds = hourly(365, 1.0);
    let solar = SolarGeometryFeature::new(SpaSolarPosition::default(), 51.2, 6.0);
    c.bench_function("join_year_with_sun_position", |b| {
        b.iter(|| {
            SeriesJoiner.join(
                black_box(&[("energy", &energy), ("T", &temperature), ("N", &clouds)]),
                Some(&solar),
            )
        })
    });
}

criterion_group!(benches, bench_alignment);
criterion_main!(benches);
