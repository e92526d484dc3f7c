//! eventsync_core - event synchronization and form engine for the eventsync calendar.
//!
//! The pure parts (event model, day index, selection state, form validation)
//! live in [`calendar`] and [`form`]. The stateful parts (repository contract,
//! invalidate-and-refetch cache, session binding) live in [`storage`],
//! [`cache`] and [`session`].

pub mod cache;
pub mod calendar;
pub mod config;
pub mod form;
pub mod serde;
pub mod session;
pub mod storage;

pub use cache::{CacheError, EventCache, EventsSnapshot, MutationKind, QueryStatus};
pub use calendar::{Event, EventChanges, EventPatch, NewEvent, SelectionState, TimeSlot};
pub use config::{CacheConfig, FormConfig};
pub use form::{EventForm, FormError, FormMode, SubmitError};
pub use session::{PrincipalId, Session};
pub use storage::{EventRepository, RepositoryError};
