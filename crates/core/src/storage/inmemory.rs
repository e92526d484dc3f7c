//! In-memory event repository for tests and demos.
//!
//! Rows are owned by the principal that created them. The current principal is
//! read from a [`Session`] on every call, the way a remote store reads it from
//! the request's bearer token.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EventRepository, RepositoryError, Result};
use crate::calendar::{
    format_timestamp, sort_events_by_start, validate_new_event, Event, EventPatch, NewEvent,
};
use crate::session::{PrincipalId, Session};

/// In-memory storage backend.
///
/// Uses a HashMap wrapped in `Arc<RwLock<_>>`. Clones share the same rows.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    events: Arc<RwLock<HashMap<String, Event>>>,
    session: Session,
}

impl InMemoryRepository {
    /// Creates an empty repository that authenticates callers through `session`.
    pub fn new(session: Session) -> Self {
        Self {
            events: Arc::new(RwLock::new(HashMap::new())),
            session,
        }
    }

    /// Inserts a row as-is, bypassing ownership checks.
    pub async fn seed(&self, event: Event) {
        self.events.write().await.insert(event.id.clone(), event);
    }

    /// Number of rows across all owners.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    fn caller(&self) -> Result<PrincipalId> {
        self.session
            .principal()
            .ok_or_else(|| RepositoryError::Rejected("JWT missing or expired".to_string()))
    }

    fn not_found(id: &str) -> RepositoryError {
        RepositoryError::NotFound {
            entity_type: "Event",
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl EventRepository for InMemoryRepository {
    async fn list_events(&self) -> Result<Vec<Event>> {
        let caller = self.caller()?;
        let events = self.events.read().await;

        let mut owned: Vec<&Event> = events
            .values()
            .filter(|event| event.user_id == caller.as_str())
            .collect();
        sort_events_by_start(&mut owned, chrono_tz::UTC);

        Ok(owned.into_iter().cloned().collect())
    }

    async fn create_event(&self, event: &NewEvent) -> Result<Event> {
        let caller = self.caller()?;
        if event.user_id != caller.as_str() {
            return Err(RepositoryError::Rejected(
                "new row violates row-level security policy for table \"events\"".to_string(),
            ));
        }
        validate_new_event(event, chrono_tz::UTC)
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;

        let now = format_timestamp(Utc::now());
        let created = event
            .clone()
            .into_event(Uuid::new_v4().to_string(), &now);

        let mut events = self.events.write().await;
        events.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_event(&self, patch: &EventPatch) -> Result<Event> {
        let caller = self.caller()?;
        let mut events = self.events.write().await;

        let event = events
            .get_mut(&patch.id)
            .filter(|event| event.user_id == caller.as_str())
            .ok_or_else(|| Self::not_found(&patch.id))?;

        let mut updated = event.clone();
        patch.changes.clone().apply_to(&mut updated);
        if patch.changes.updated_at.is_none() {
            updated.updated_at = format_timestamp(Utc::now());
        }

        *event = updated.clone();
        Ok(updated)
    }

    async fn delete_event(&self, id: &str) -> Result<()> {
        let caller = self.caller()?;
        let mut events = self.events.write().await;

        let owned = events
            .get(id)
            .is_some_and(|event| event.user_id == caller.as_str());
        if !owned {
            return Err(Self::not_found(id));
        }
        events.remove(id);
        Ok(())
    }
}
