//! Add/edit event form: field state, validation and dispatch to the cache.

mod assemble;
mod draft;
mod engine;
mod error;

pub use assemble::{combine_local, format_time_of_day, parse_time_of_day};
pub use draft::EventDraft;
pub use engine::{EventForm, FormMode, Submission};
pub use error::{FormError, SubmitError};
