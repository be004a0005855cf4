//! Resampling of stored series onto a uniform UTC bucket calendar.

use crate::dataset::error::{AlignError, AmbiguousTimeError, LocalTimeIssue};
use crate::types::sample::{Sample, StoredSeries, TimeSeries};
use chrono::{DateTime, DurationRound, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use log::{info, warn};
use std::collections::BTreeMap;

/// How samples falling into the same bucket are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// For period quantities such as energy per quarter hour.
    Sum,
    /// For values already at bucket resolution.
    LastValue,
    Mean,
}

/// The aligned series plus every sample dropped for lacking a unique instant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedSeries {
    pub series: TimeSeries,
    pub dropped: Vec<AmbiguousTimeError>,
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    last: f64,
    count: u32,
}

impl Accumulator {
    fn start(value: f64) -> Self {
        Self {
            sum: value,
            last: value,
            count: 1,
        }
    }

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.last = value;
        self.count += 1;
    }

    fn finish(self, aggregation: Aggregation) -> f64 {
        match aggregation {
            Aggregation::Sum => self.sum,
            Aggregation::LastValue => self.last,
            Aggregation::Mean => self.sum / f64::from(self.count),
        }
    }
}

/// Resamples naive-timestamped samples onto buckets of a fixed width.
///
/// Timestamps are first localized in the series' declared timezone and converted to
/// UTC. The bucket of a sample is its UTC instant truncated to the bucket width, and
/// is labelled with its start.
#[derive(Debug, Clone, Copy)]
pub struct HourlyAligner {
    bucket_width: TimeDelta,
}

impl Default for HourlyAligner {
    fn default() -> Self {
        Self {
            bucket_width: TimeDelta::hours(1),
        }
    }
}

impl HourlyAligner {
    pub fn new(bucket_width: TimeDelta) -> Result<Self, AlignError> {
        if bucket_width <= TimeDelta::zero() {
            return Err(AlignError::InvalidBucketWidth(bucket_width));
        }
        Ok(Self { bucket_width })
    }

    pub fn align(
        &self,
        series: &StoredSeries,
        aggregation: Aggregation,
        timezone: Tz,
    ) -> Result<AlignedSeries, AlignError> {
        let aligned = self.align_samples(&series.samples, aggregation, timezone)?;
        if !aligned.dropped.is_empty() {
            info!(
                "Dropped {} sample(s) of {} without a unique instant in {}",
                aligned.dropped.len(),
                series.name,
                timezone
            );
        }
        Ok(aligned)
    }

    pub fn align_samples(
        &self,
        samples: &[Sample],
        aggregation: Aggregation,
        timezone: Tz,
    ) -> Result<AlignedSeries, AlignError> {
        let mut dropped = Vec::new();
        let mut instants = Vec::with_capacity(samples.len());
        for sample in samples {
            match localize(sample.timestamp, timezone) {
                Ok(instant) => instants.push((instant, sample.value)),
                Err(e) => {
                    warn!("Dropping sample: {}", e);
                    dropped.push(e);
                }
            }
        }
        // Last-value semantics need chronological order, which local time does not
        // guarantee across a transition.
        instants.sort_by_key(|(instant, _)| *instant);

        let mut buckets: BTreeMap<DateTime<Utc>, Accumulator> = BTreeMap::new();
        for (instant, value) in instants {
            let bucket = instant
                .duration_trunc(self.bucket_width)
                .map_err(|source| AlignError::Truncate {
                    timestamp: instant,
                    width: self.bucket_width,
                    source,
                })?;
            buckets
                .entry(bucket)
                .and_modify(|acc| acc.push(value))
                .or_insert_with(|| Accumulator::start(value));
        }

        let series = buckets
            .into_iter()
            .map(|(bucket, acc)| (bucket, acc.finish(aggregation)))
            .collect();
        Ok(AlignedSeries { series, dropped })
    }
}

/// Resolves a wall-clock timestamp in `timezone` to a UTC instant.
pub fn localize(timestamp: NaiveDateTime, timezone: Tz) -> Result<DateTime<Utc>, AmbiguousTimeError> {
    match timezone.from_local_datetime(&timestamp) {
        LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(_, _) => Err(AmbiguousTimeError {
            timestamp,
            timezone,
            issue: LocalTimeIssue::Ambiguous,
        }),
        LocalResult::None => Err(AmbiguousTimeError {
            timestamp,
            timezone,
            issue: LocalTimeIssue::Nonexistent,
        }),
    }
}

/// Timestamp of a date plus an hour offset from 1 to 24.
///
/// Hour 24 is midnight of the following day. Offsets outside 1–24 give `None`.
pub fn combine_date_hour(date: NaiveDate, hour: u32) -> Option<NaiveDateTime> {
    if !(1..=24).contains(&hour) {
        return None;
    }
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::hours(i64::from(hour)))
}
