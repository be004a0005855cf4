use chrono::{Days, NaiveDate, Utc};
use chrono_tz::Tz;

/// Source of "today" for request budgets and fetch planning.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    /// Last day the providers consider complete.
    fn yesterday(&self) -> NaiveDate {
        let today = self.today();
        today.checked_sub_days(Days::new(1)).unwrap_or(today)
    }
}

/// Wall-clock date in the site's timezone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    timezone: Tz,
}

impl SystemClock {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

/// A clock stuck on one day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
