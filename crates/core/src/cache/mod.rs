mod error;
mod keys;
mod status;
mod store;

pub use error::{CacheError, MutationKind, Result};
pub use keys::events_key;
pub use status::{EventsSnapshot, QueryStatus};
pub use store::EventCache;
