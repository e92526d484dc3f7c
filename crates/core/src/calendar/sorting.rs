use std::cmp::Ordering;

use chrono::NaiveDate;
use chrono_tz::Tz;

use super::operations::events_on_date;
use super::time::month_dates;
use super::types::{DayEvents, Event};

/// Sorts events ascending by start time. Unparsable starts sort last.
pub fn sort_events_by_start(events: &mut [&Event], zone: Tz) {
    events.sort_by(|a, b| match (a.start_at(zone), b.start_at(zone)) {
        (Some(a_start), Some(b_start)) => a_start.cmp(&b_start),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Builds the per-day view for every day of the displayed month.
///
/// One day-index call per cell; fine at the scale of a single user's events.
pub fn month_days(display_month: NaiveDate, events: &[Event], zone: Tz) -> Vec<DayEvents<'_>> {
    month_dates(display_month)
        .into_iter()
        .map(|date| DayEvents {
            date,
            events: events_on_date(date, events, zone),
        })
        .collect()
}
