use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;
use std::fmt::{Display, Formatter};

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let (next_month_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let first_day_of_next_month = NaiveDate::from_ymd_opt(next_month_year, next_month, 1)?;
    let last_day_of_current_month = first_day_of_next_month - Duration::days(1);
    Some(last_day_of_current_month.day())
}

/// A calendar month, `Month(year, month)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Month(pub i32, pub u32);

impl Month {
    /// The month a date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        Self(date.year(), date.month())
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, self.1, 1)
    }

    pub fn last_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, self.1, days_in_month(self.0, self.1)?)
    }

    pub fn next(self) -> Option<Self> {
        if self.1 == 12 {
            Some(Self(self.0.checked_add(1)?, 1))
        } else {
            Some(Self(self.0, self.1 + 1))
        }
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2019, 2), Some(28));
        assert_eq!(days_in_month(2020, 2), Some(29));
        assert_eq!(days_in_month(2019, 12), Some(31));
        assert_eq!(days_in_month(2019, 13), None);
    }

    #[test]
    fn test_month_bounds_and_rollover() {
        let december = Month(2019, 12);
        assert_eq!(december.first_day(), NaiveDate::from_ymd_opt(2019, 12, 1));
        assert_eq!(december.last_day(), NaiveDate::from_ymd_opt(2019, 12, 31));
        assert_eq!(december.next(), Some(Month(2020, 1)));
        assert_eq!(december.to_string(), "2019-12");
    }
}
