//! Wall-clock fields to absolute instants.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::FormError;

/// Parses an `HH:MM` time of day. One or two digits per part are accepted.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let is_part =
        |part: &str| (1..=2).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit());
    if !is_part(hours) || !is_part(minutes) {
        return None;
    }
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)
}

/// Formats a time of day the way the form shows it.
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Combines a calendar day and a time of day in `zone` into a UTC instant.
///
/// Ambiguous local times (clocks turned back) resolve to the earlier instant.
/// Local times inside a daylight-saving gap are rejected.
pub fn combine_local(
    date: NaiveDate,
    time: NaiveTime,
    zone: Tz,
) -> Result<DateTime<Utc>, FormError> {
    zone.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|at| at.with_timezone(&Utc))
        .ok_or_else(|| FormError::NonexistentTime(zone.name().to_string()))
}
