use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::time::parse_timestamp;
use crate::serde::deserialize_nullable;

/// A timed calendar event as stored by the event repository.
///
/// Timestamps are kept as the strings the repository returned. A value that
/// fails to parse is still mirrored verbatim; consumers decide how to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    /// Owner of the event. Immutable after creation.
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub is_all_day: bool,
    /// IANA zone the event was created in.
    #[serde(default)]
    pub time_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rrule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exdates: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Event {
    /// Parses `start_time`, interpreting offset-less values in `zone`.
    pub fn start_at(&self, zone: Tz) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.start_time, zone)
    }

    /// Parses `end_time`, interpreting offset-less values in `zone`.
    pub fn end_at(&self, zone: Tz) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.end_time, zone)
    }

    /// Start time as wall-clock time in `zone`.
    pub fn local_start(&self, zone: Tz) -> Option<DateTime<Tz>> {
        self.start_at(zone).map(|at| at.with_timezone(&zone))
    }

    /// End time as wall-clock time in `zone`.
    pub fn local_end(&self, zone: Tz) -> Option<DateTime<Tz>> {
        self.end_at(zone).map(|at| at.with_timezone(&zone))
    }

    /// Calendar day the event starts on in `zone`.
    pub fn local_date(&self, zone: Tz) -> Option<NaiveDate> {
        self.local_start(zone).map(|at| at.date_naive())
    }
}

/// Payload for creating an event: an [`Event`] minus the server-assigned fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub is_all_day: bool,
    pub time_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rrule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exdates: Option<Vec<String>>,
}

impl NewEvent {
    /// Builds the persisted record the way a repository would.
    pub fn into_event(self, id: impl Into<String>, now: &str) -> Event {
        Event {
            id: id.into(),
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            location: self.location,
            start_time: self.start_time,
            end_time: self.end_time,
            is_all_day: self.is_all_day,
            time_zone: self.time_zone,
            rrule: self.rrule,
            recurrence_end: self.recurrence_end,
            exdates: self.exdates,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

/// Field changes carried by an update.
///
/// `None` leaves a field untouched. For the nullable fields, `Some(None)` clears
/// the value on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_nullable"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_nullable"
    )]
    pub location: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_nullable"
    )]
    pub rrule: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_nullable"
    )]
    pub recurrence_end: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_nullable"
    )]
    pub exdates: Option<Option<Vec<String>>>,
    /// Set by the cache to the request time on every update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl EventChanges {
    /// Changes that overwrite every form-editable field of an event.
    pub fn from_new_event(event: NewEvent) -> Self {
        Self {
            title: Some(event.title),
            description: Some(event.description),
            location: Some(event.location),
            start_time: Some(event.start_time),
            end_time: Some(event.end_time),
            is_all_day: Some(event.is_all_day),
            time_zone: Some(event.time_zone),
            ..Self::default()
        }
    }

    /// Applies the changes to an existing event. `id` and `user_id` never change.
    pub fn apply_to(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(start_time) = self.start_time {
            event.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            event.end_time = end_time;
        }
        if let Some(is_all_day) = self.is_all_day {
            event.is_all_day = is_all_day;
        }
        if let Some(time_zone) = self.time_zone {
            event.time_zone = time_zone;
        }
        if let Some(rrule) = self.rrule {
            event.rrule = rrule;
        }
        if let Some(recurrence_end) = self.recurrence_end {
            event.recurrence_end = recurrence_end;
        }
        if let Some(exdates) = self.exdates {
            event.exdates = exdates;
        }
        if let Some(updated_at) = self.updated_at {
            event.updated_at = updated_at;
        }
    }
}

/// Payload for updating an event: required id plus partial changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    pub id: String,
    #[serde(flatten)]
    pub changes: EventChanges,
}

impl EventPatch {
    pub fn new(id: impl Into<String>, changes: EventChanges) -> Self {
        Self {
            id: id.into(),
            changes,
        }
    }
}

/// Events for a single day of the displayed month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEvents<'a> {
    pub date: NaiveDate,
    pub events: Vec<&'a Event>,
}

impl DayEvents<'_> {
    /// Returns true if the day has no events (no indicator dot).
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the number of events on this day.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}
