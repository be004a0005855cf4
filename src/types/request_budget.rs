use chrono::NaiveDate;

/// Number of monitoring API requests made on one calendar day.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestBudget {
    pub date: NaiveDate,
    pub count: u32,
}

impl RequestBudget {
    /// A budget with nothing spent yet.
    pub fn fresh(date: NaiveDate) -> Self {
        Self { date, count: 0 }
    }

    /// The budget after one more request.
    pub fn incremented(self) -> Self {
        Self {
            date: self.date,
            count: self.count.saturating_add(1),
        }
    }
}

/// Soft and hard daily request thresholds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestLimits {
    /// Past this count every call logs a warning.
    pub soft: u32,
    /// Once this many calls were made, further calls are refused.
    pub hard: u32,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            soft: 250,
            hard: 275,
        }
    }
}
