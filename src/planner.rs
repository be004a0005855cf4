//! Computes which calendar-day windows of a provider's series still have to be fetched.

use crate::types::fetch_window::FetchWindow;
use crate::types::month::Month;
use chrono::{Days, NaiveDate};
use log::debug;

/// Plans month-bounded fetch windows from the last persisted date onwards.
///
/// The planner is a pure function of its inputs. It never looks at the clock; the
/// caller passes in what the provider reports as complete (usually yesterday).
#[derive(Debug, Default, Clone, Copy)]
pub struct IncrementalFetchPlanner;

impl IncrementalFetchPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Where fetching resumes: the day after the last persisted one, or the provider's
    /// earliest date when nothing was persisted yet.
    pub fn cursor(
        &self,
        last_persisted_date: Option<NaiveDate>,
        provider_earliest_date: NaiveDate,
    ) -> Option<NaiveDate> {
        match last_persisted_date {
            Some(last) => last.checked_add_days(Days::new(1)),
            None => Some(provider_earliest_date),
        }
    }

    /// Returns the chronologically ordered windows still missing.
    ///
    /// The first window starts at the cursor and every later one on the first of its
    /// month. Each window ends on the last day of its month, the final one is clipped to
    /// `provider_latest_complete_date`. An empty plan means the series is up to date.
    pub fn plan(
        &self,
        last_persisted_date: Option<NaiveDate>,
        provider_earliest_date: NaiveDate,
        provider_latest_complete_date: NaiveDate,
    ) -> Vec<FetchWindow> {
        let Some(mut cursor) = self.cursor(last_persisted_date, provider_earliest_date) else {
            return Vec::new();
        };

        let mut windows = Vec::new();
        while cursor <= provider_latest_complete_date {
            let month = Month::containing(cursor);
            let Some(month_end) = month.last_day() else {
                break;
            };
            let end = month_end.min(provider_latest_complete_date);
            windows.push(FetchWindow::new(cursor, end));

            let Some(next_start) = month.next().and_then(Month::first_day) else {
                break;
            };
            cursor = next_start;
        }

        debug!(
            "Planned {} window(s) from {:?} up to {}",
            windows.len(),
            last_persisted_date,
            provider_latest_complete_date
        );
        windows
    }
}
