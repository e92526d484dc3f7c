mod error;
mod operations;
mod selection;
mod slot;
mod sorting;
mod time;
mod types;

pub use error::EventError;
pub use operations::{
    events_for_selection, events_on_date, validate_new_event, validate_time_range,
};
pub use selection::SelectionState;
pub use slot::TimeSlot;
pub use sorting::{month_days, sort_events_by_start};
pub use time::{
    format_timestamp, local_zone, month_dates, month_start, parse_timestamp, today,
};
pub use types::{DayEvents, Event, EventChanges, EventPatch, NewEvent};
