//! Time-series value types shared by acquisition, storage and alignment.
//!
//! Values travel through three shapes:
//!
//! * [`TimestampedValue`] is a sample exactly as a provider reported it, value possibly absent.
//! * [`Sample`] is a resolved sample as it is stored, in the declared time basis of its series.
//! * [`TimeSeries`] is the aligned form, keyed by UTC instant.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::BTreeMap;

/// Storage format for naive timestamps. Lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How an absent provider value is turned into something storable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsentPolicy {
    /// Absent means zero. Used for production energy: a null is an offline inverter.
    Zero,
    /// Absent samples are not stored at all.
    Drop,
}

/// A raw sample as reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampedValue {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

impl TimestampedValue {
    pub fn new(timestamp: NaiveDateTime, value: Option<f64>) -> Self {
        Self { timestamp, value }
    }

    /// Resolves the absent case according to `policy`.
    pub fn resolve(self, policy: AbsentPolicy) -> Option<Sample> {
        match (self.value, policy) {
            (Some(value), _) => Some(Sample::new(self.timestamp, value)),
            (None, AbsentPolicy::Zero) => Some(Sample::new(self.timestamp, 0.0)),
            (None, AbsentPolicy::Drop) => None,
        }
    }
}

/// A resolved sample, timestamp in the time basis of the series it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Resolves a batch of raw values, keeping input order.
pub fn resolve_all(values: Vec<TimestampedValue>, policy: AbsentPolicy) -> Vec<Sample> {
    values
        .into_iter()
        .filter_map(|value| value.resolve(policy))
        .collect()
}

/// Everything persisted for one named series, ordered by timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoredSeries {
    pub name: String,
    pub samples: Vec<Sample>,
}

impl StoredSeries {
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A series keyed by UTC instant. Timestamps are unique by construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    points: BTreeMap<DateTime<Utc>, f64>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, timestamp: DateTime<Utc>, value: f64) -> Option<f64> {
        self.points.insert(timestamp, value)
    }

    pub fn get(&self, timestamp: &DateTime<Utc>) -> Option<f64> {
        self.points.get(timestamp).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.points.keys().next().copied()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.points.keys().next_back().copied()
    }

    /// Points in ascending timestamp order.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.points.iter().map(|(ts, value)| (*ts, *value))
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.points.keys().copied()
    }
}

impl FromIterator<(DateTime<Utc>, f64)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (DateTime<Utc>, f64)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
