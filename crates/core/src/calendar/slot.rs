use std::fmt;

use chrono::NaiveTime;
use chrono_tz::Tz;

use super::types::Event;

/// Start and end of an event as local times of day, for list rendering.
///
/// A side that does not parse is `None` and renders as "Invalid start" or
/// "Invalid end".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl TimeSlot {
    pub fn of(event: &Event, zone: Tz) -> Self {
        Self {
            start: event.local_start(zone).map(|at| at.time()),
            end: event.local_end(zone).map(|at| at.time()),
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start {
            Some(start) => write!(f, "{}", start.format("%H:%M"))?,
            None => write!(f, "Invalid start")?,
        }
        write!(f, " - ")?;
        match self.end {
            Some(end) => write!(f, "{}", end.format("%H:%M")),
            None => write!(f, "Invalid end"),
        }
    }
}
