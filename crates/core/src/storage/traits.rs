use async_trait::async_trait;

use super::Result;
use crate::calendar::{Event, EventPatch, NewEvent};

/// Remote event store, scoped to the authenticated principal.
///
/// Row ownership is enforced here, not by callers. Every write returns the
/// canonical persisted record; there is no partial success.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Lists the caller's events ordered by start time ascending.
    async fn list_events(&self) -> Result<Vec<Event>>;

    /// Creates an event. Fails if `user_id` is not the caller.
    async fn create_event(&self, event: &NewEvent) -> Result<Event>;

    /// Updates an event the caller owns.
    async fn update_event(&self, patch: &EventPatch) -> Result<Event>;

    /// Hard-deletes an event the caller owns.
    async fn delete_event(&self, id: &str) -> Result<()>;
}
