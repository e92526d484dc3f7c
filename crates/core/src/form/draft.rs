use chrono::NaiveDate;
use chrono_tz::Tz;

use super::assemble::{combine_local, format_time_of_day, parse_time_of_day};
use super::FormError;
use crate::calendar::{format_timestamp, Event, NewEvent};
use crate::config::FormConfig;
use crate::session::PrincipalId;

/// Editable form fields, as text, plus the working day.
///
/// The working day is held separately from the calendar selection so that an
/// edit keeps its own date while the user browses the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    pub date: Option<NaiveDate>,
}

impl EventDraft {
    /// Empty fields with the default times on `date`.
    pub fn with_defaults(date: Option<NaiveDate>, config: &FormConfig) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            location: String::new(),
            start_time: format_time_of_day(config.default_start),
            end_time: format_time_of_day(config.default_end),
            date,
        }
    }

    /// Fields of an existing event, in `zone`.
    ///
    /// Unparsable times fall back to the defaults; an unparsable start also
    /// falls back to `fallback_date`.
    pub fn from_event(
        event: &Event,
        fallback_date: NaiveDate,
        zone: Tz,
        config: &FormConfig,
    ) -> Self {
        let start = event.local_start(zone);
        let end = event.local_end(zone);

        Self {
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            location: event.location.clone().unwrap_or_default(),
            start_time: format_time_of_day(start.map_or(config.default_start, |at| at.time())),
            end_time: format_time_of_day(end.map_or(config.default_end, |at| at.time())),
            date: Some(start.map_or(fallback_date, |at| at.date_naive())),
        }
    }

    /// Moves the draft to `date` and restores the default times.
    pub fn reseed(&mut self, date: Option<NaiveDate>, config: &FormConfig) {
        self.date = date;
        self.start_time = format_time_of_day(config.default_start);
        self.end_time = format_time_of_day(config.default_end);
    }

    /// Validates the fields and builds the create payload.
    ///
    /// Checks run in order and the first failure is returned: principal,
    /// required fields, time format, then the combined start/end in `zone`.
    pub fn build_payload(
        &self,
        principal: Option<&PrincipalId>,
        zone: Tz,
    ) -> Result<NewEvent, FormError> {
        let principal = principal.ok_or(FormError::NotAuthenticated)?;

        let title = self.title.trim();
        if title.is_empty() || self.start_time.trim().is_empty() || self.end_time.trim().is_empty()
        {
            return Err(FormError::MissingFields);
        }
        let date = self.date.ok_or(FormError::MissingFields)?;

        let (Some(start), Some(end)) = (
            parse_time_of_day(&self.start_time),
            parse_time_of_day(&self.end_time),
        ) else {
            return Err(FormError::InvalidTimeFormat);
        };

        let start_at = combine_local(date, start, zone)?;
        let end_at = combine_local(date, end, zone)?;
        if end_at <= start_at {
            return Err(FormError::EndNotAfterStart);
        }

        Ok(NewEvent {
            user_id: principal.to_string(),
            title: title.to_string(),
            description: non_empty(&self.description),
            location: non_empty(&self.location),
            start_time: format_timestamp(start_at),
            end_time: format_timestamp(end_at),
            is_all_day: false,
            time_zone: zone.name().to_string(),
            rrule: None,
            recurrence_end: None,
            exdates: None,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
