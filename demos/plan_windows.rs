use chrono::NaiveDate;
use solar_dataset::IncrementalFetchPlanner;

fn main() {
    let Some(earliest) = NaiveDate::from_ymd_opt(2019, 8, 15) else {
        return;
    };
    let Some(yesterday) = NaiveDate::from_ymd_opt(2019, 11, 3) else {
        return;
    };
    let planner = IncrementalFetchPlanner::new();

    println!("Fresh database:");
    for window in planner.plan(None, earliest, yesterday) {
        println!("  {} ({} days)", window, window.days());
    }

    println!("Resuming after 2019-10-20:");
    for window in planner.plan(NaiveDate::from_ymd_opt(2019, 10, 20), earliest, yesterday) {
        println!("  {} ({} days)", window, window.days());
    }
}
