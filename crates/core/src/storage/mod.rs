mod error;
mod http_mapping;
#[cfg(feature = "inmemory")]
mod inmemory;
mod traits;

pub use error::{RepositoryError, Result};
pub use http_mapping::status_code_to_repository_error;
#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryRepository;
pub use traits::EventRepository;
