//! Event table operations.

use async_trait::async_trait;
use eventsync_core::storage::{EventRepository, RepositoryError, Result as RepositoryResult};
use eventsync_core::{Event, EventPatch, NewEvent};
use reqwest::Method;

use super::EventsClient;
use crate::error::{ClientError, Result};

const EVENTS_PATH: &str = "events";

impl EventsClient {
    /// List the caller's events, ordered by start time.
    ///
    /// Row-level security on the server restricts the rows to the token's owner.
    pub async fn fetch_events(&self) -> Result<Vec<Event>> {
        let response = self
            .request(Method::GET, EVENTS_PATH)?
            .query(&[("select", "*"), ("order", "start_time.asc")])
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Insert one event and return the stored row.
    pub async fn insert_event(&self, event: &NewEvent) -> Result<Event> {
        let response = self
            .request(Method::POST, EVENTS_PATH)?
            .header("Prefer", "return=representation")
            .json(std::slice::from_ref(event))
            .send()
            .await?;
        let rows: Vec<Event> = self.handle_response(response).await?;
        first_row(rows, || ClientError::NoData("adding"))
    }

    /// Apply a partial update and return the stored row.
    pub async fn patch_event(&self, patch: &EventPatch) -> Result<Event> {
        let response = self
            .request(Method::PATCH, EVENTS_PATH)?
            .query(&[("id", format!("eq.{}", patch.id))])
            .header("Prefer", "return=representation")
            .json(&patch.changes)
            .send()
            .await?;
        let rows: Vec<Event> = self.handle_response(response).await?;
        first_row(rows, || ClientError::NoData("updating"))
    }

    /// Delete an event by id.
    ///
    /// The server answers success even when no row matched, so the deleted
    /// rows are requested back and an empty result is reported as not found.
    pub async fn remove_event(&self, id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, EVENTS_PATH)?
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<Event> = self.handle_response(response).await?;
        first_row(rows, || ClientError::NotFound { id: id.to_string() }).map(|_| ())
    }
}

/// First row of a `return=representation` response, or `missing()` when empty.
fn first_row(rows: Vec<Event>, missing: impl FnOnce() -> ClientError) -> Result<Event> {
    rows.into_iter().next().ok_or_else(missing)
}

#[async_trait]
impl EventRepository for EventsClient {
    async fn list_events(&self) -> RepositoryResult<Vec<Event>> {
        let events = self.fetch_events().await.map_err(RepositoryError::from)?;
        tracing::debug!(count = events.len(), "Fetched events");
        Ok(events)
    }

    async fn create_event(&self, event: &NewEvent) -> RepositoryResult<Event> {
        self.insert_event(event).await.map_err(RepositoryError::from)
    }

    async fn update_event(&self, patch: &EventPatch) -> RepositoryResult<Event> {
        self.patch_event(patch).await.map_err(RepositoryError::from)
    }

    async fn delete_event(&self, id: &str) -> RepositoryResult<()> {
        self.remove_event(id).await.map_err(RepositoryError::from)
    }
}
