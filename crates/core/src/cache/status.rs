use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::calendar::{events_on_date, Event};

/// State of the current principal's event collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    /// No principal; the query is inert.
    Disabled,
    /// No data yet and a fetch is pending.
    Loading,
    Fresh,
    /// Data is older than the freshness window or was invalidated, and no
    /// refetch is running.
    Stale,
    /// Stale data is being shown while a refetch runs.
    Revalidating,
    /// The last fetch failed after retries.
    Failed(String),
}

/// Point-in-time view of the cached collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsSnapshot {
    events: Arc<Vec<Event>>,
    pub status: QueryStatus,
}

impl EventsSnapshot {
    pub(crate) fn new(events: Arc<Vec<Event>>, status: QueryStatus) -> Self {
        Self { events, status }
    }

    /// Empty snapshot for a signed-out session.
    pub fn disabled() -> Self {
        Self::new(Arc::new(Vec::new()), QueryStatus::Disabled)
    }

    /// Events in repository order (start time ascending).
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// No data has been fetched yet.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    /// Any fetch is running, first load or background.
    pub fn is_fetching(&self) -> bool {
        matches!(self.status, QueryStatus::Loading | QueryStatus::Revalidating)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            QueryStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Day index over this snapshot.
    pub fn events_on(&self, date: NaiveDate, zone: Tz) -> Vec<&Event> {
        events_on_date(date, &self.events, zone)
    }
}
