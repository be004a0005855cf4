use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Europe::Amsterdam;
use solar_dataset::{SolarPosition, SolarPositionError, SpaSolarPosition};

fn main() -> Result<(), SolarPositionError> {
    let Some(day) = NaiveDate::from_ymd_opt(2019, 6, 21) else {
        return Ok(());
    };
    let spa = SpaSolarPosition::default();
    for hour in 0..24 {
        let Some(local) = day.and_hms_opt(hour, 0, 0) else {
            continue;
        };
        let Some(at) = Amsterdam.from_local_datetime(&local).single() else {
            continue;
        };
        let sun = spa.position(51.2, 6.0, at.with_timezone(&Utc))?;
        println!(
            "{} altitude {:6.2} azimuth {:6.2}",
            at.format("%H:%M %Z"),
            sun.altitude,
            sun.azimuth
        );
    }
    Ok(())
}
