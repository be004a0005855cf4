use chrono::NaiveDate;
use std::fmt;
use std::fmt::{Display, Formatter};

/// An inclusive range of calendar days submitted as one request to a time-series API.
///
/// Windows produced by [`crate::IncrementalFetchPlanner`] never span more than one
/// calendar month.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of calendar days covered, both bounds included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for FetchWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
