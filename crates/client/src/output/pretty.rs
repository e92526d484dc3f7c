//! Pretty output formatting.

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use eventsync_core::calendar::{month_days, DayEvents};
use eventsync_core::{Event, TimeSlot};

/// Format an event as one list line: time range, title and location.
pub fn format_event(event: &Event, zone: Tz) -> String {
    let mut output = format!("{}  {}", TimeSlot::of(event, zone), event.title);
    if let Some(location) = &event.location {
        output.push_str(&format!(" @ {}", location));
    }
    output
}

/// Format an event with its id and description, for write confirmations.
pub fn format_event_detail(event: &Event, zone: Tz) -> String {
    let mut output = format!("{}\n  ID: {}", format_event(event, zone), event.id);
    if let Some(description) = &event.description {
        output.push_str(&format!("\n  Description: {}", description));
    }
    output
}

/// Format the events of one day, already filtered and sorted.
pub fn format_day(date: NaiveDate, events: &[&Event], zone: Tz) -> String {
    let header = date.format("%A, %B %-d, %Y").to_string();
    if events.is_empty() {
        return format!("{}\nNo events scheduled for this day.", header);
    }
    let mut output = format!("{} ({})\n", header, events.len());
    output.push_str(&"-".repeat(40));
    for event in events {
        output.push_str(&format!("\n{}", format_event(event, zone)));
    }
    output
}

/// Format the displayed month as one line per day that has events.
pub fn format_month(display_month: NaiveDate, events: &[Event], zone: Tz) -> String {
    let days: Vec<DayEvents<'_>> = month_days(display_month, events, zone)
        .into_iter()
        .filter(|day| !day.is_empty())
        .collect();

    let header = display_month.format("%B %Y").to_string();
    if days.is_empty() {
        return format!("{}\nNo events this month.", header);
    }
    let mut output = format!("{}\n", header);
    output.push_str(&"-".repeat(40));
    for day in days {
        let noun = if day.event_count() == 1 { "event" } else { "events" };
        output.push_str(&format!(
            "\n{:>2} {}  {} {}",
            day.date.day(),
            day.date.format("%a"),
            day.event_count(),
            noun
        ));
    }
    output
}
