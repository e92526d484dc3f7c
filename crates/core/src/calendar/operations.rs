use chrono::NaiveDate;
use chrono_tz::Tz;

use super::error::EventError;
use super::sorting::sort_events_by_start;
use super::time::parse_timestamp;
use super::types::{Event, NewEvent};

/// Returns the events that start on `date` in `zone`, ascending by start time.
///
/// Events whose `start_time` does not parse are left out. Pure and cheap enough
/// to call once per visible calendar cell.
pub fn events_on_date(date: NaiveDate, events: &[Event], zone: Tz) -> Vec<&Event> {
    let mut matching: Vec<&Event> = events
        .iter()
        .filter(|event| event.local_date(zone) == Some(date))
        .collect();
    sort_events_by_start(&mut matching, zone);
    matching
}

/// Day index for an optional selection. No selection means no events.
pub fn events_for_selection(
    selected: Option<NaiveDate>,
    events: &[Event],
    zone: Tz,
) -> Vec<&Event> {
    match selected {
        Some(date) => events_on_date(date, events, zone),
        None => Vec::new(),
    }
}

/// Validates a create payload before it is sent or stored.
pub fn validate_new_event(event: &NewEvent, zone: Tz) -> Result<(), EventError> {
    if event.user_id.trim().is_empty() {
        return Err(EventError::MissingUserId);
    }
    if event.title.trim().is_empty() {
        return Err(EventError::EmptyTitle);
    }
    validate_time_range(&event.start_time, &event.end_time, zone)
}

/// Checks that both timestamps parse and that end is strictly after start.
pub fn validate_time_range(start: &str, end: &str, zone: Tz) -> Result<(), EventError> {
    let start_at = parse_timestamp(start, zone)
        .ok_or_else(|| EventError::InvalidTimestamp(start.to_string()))?;
    let end_at =
        parse_timestamp(end, zone).ok_or_else(|| EventError::InvalidTimestamp(end.to_string()))?;
    if end_at <= start_at {
        return Err(EventError::InvalidTimeRange);
    }
    Ok(())
}
