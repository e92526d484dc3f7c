//! Invalidate-and-refetch cache of the current principal's events.
//!
//! Reads are stale-while-revalidate: with no data the caller waits for the
//! fetch, with stale data the caller gets it immediately while one background
//! refetch runs. Writes go straight to the repository and, on success,
//! invalidate the collection and start a refetch. Nothing is merged locally.
//!
//! Every fetch takes a sequence number. A result is applied only when it is
//! newer than the data already held, and data from a fetch that started
//! before the latest invalidation stays stale. Overlapping writes therefore
//! converge on the state after the last successful write.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use lru::LruCache;
use tokio::sync::{watch, Mutex};

use super::{events_key, CacheError, EventsSnapshot, MutationKind, QueryStatus, Result};
use crate::calendar::{format_timestamp, Event, EventPatch, NewEvent};
use crate::config::CacheConfig;
use crate::session::Session;
use crate::storage::{EventRepository, RepositoryError};

/// Cached collection for one principal.
#[derive(Debug)]
struct Collection {
    events: Option<Arc<Vec<Event>>>,
    fetched_at: Option<Instant>,
    /// Sequence number of the fetch whose data is held.
    applied_seq: u64,
    /// Last sequence number handed out when the collection was invalidated.
    invalidated_seq: u64,
    /// Latest fetch started for this collection, while it runs.
    in_flight: Option<u64>,
    error: Option<String>,
    last_used: Instant,
}

impl Collection {
    fn new() -> Self {
        Self {
            events: None,
            fetched_at: None,
            applied_seq: 0,
            invalidated_seq: 0,
            in_flight: None,
            error: None,
            last_used: Instant::now(),
        }
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        self.events.is_some()
            && self.applied_seq > self.invalidated_seq
            && self.fetched_at.is_some_and(|at| at.elapsed() < stale_time)
    }

    /// A running fetch started after the last invalidation.
    fn has_current_fetch(&self) -> bool {
        self.in_flight.is_some_and(|seq| seq > self.invalidated_seq)
    }

    fn status(&self, stale_time: Duration) -> QueryStatus {
        match &self.events {
            None => match (&self.error, self.in_flight) {
                (Some(message), None) => QueryStatus::Failed(message.clone()),
                _ => QueryStatus::Loading,
            },
            Some(_) if self.is_fresh(stale_time) => QueryStatus::Fresh,
            Some(_) if self.in_flight.is_some() => QueryStatus::Revalidating,
            Some(_) => match &self.error {
                Some(message) => QueryStatus::Failed(message.clone()),
                None => QueryStatus::Stale,
            },
        }
    }

    fn snapshot(&self, stale_time: Duration) -> EventsSnapshot {
        EventsSnapshot::new(
            self.events.clone().unwrap_or_default(),
            self.status(stale_time),
        )
    }
}

/// Decrements the in-flight fetch count when dropped.
struct FlightGuard(Arc<watch::Sender<usize>>);

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.send_modify(|count| *count = count.saturating_sub(1));
    }
}

/// A started fetch, applied to `key` when it completes.
struct Fetch {
    key: String,
    seq: u64,
    _flight: FlightGuard,
}

/// Clears a pending mutation flag when dropped.
struct PendingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

struct Inner<R> {
    repository: Arc<R>,
    session: Session,
    config: CacheConfig,
    collections: Mutex<LruCache<String, Collection>>,
    fetch_seq: AtomicU64,
    in_flight: Arc<watch::Sender<usize>>,
    pending: [AtomicBool; 3],
}

impl<R: EventRepository> Inner<R> {
    /// Registers a new fetch for `collection`. Called with the collections lock held.
    fn start_fetch(&self, key: &str, collection: &mut Collection) -> Fetch {
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        collection.in_flight = Some(seq);
        self.in_flight.send_modify(|count| *count += 1);
        Fetch {
            key: key.to_string(),
            seq,
            _flight: FlightGuard(Arc::clone(&self.in_flight)),
        }
    }

    async fn fetch_with_retry(&self) -> std::result::Result<Vec<Event>, RepositoryError> {
        let mut attempt = 0;
        loop {
            match self.repository.list_events().await {
                Ok(events) => return Ok(events),
                Err(err) if attempt < self.config.read_retries => {
                    attempt += 1;
                    tracing::warn!(attempt, error = %err, "Event list fetch failed, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn run_fetch(&self, fetch: Fetch) -> Result<()> {
        let result = self.fetch_with_retry().await;

        let mut collections = self.collections.lock().await;
        let Some(collection) = collections.peek_mut(fetch.key.as_str()) else {
            tracing::trace!(key = %fetch.key, "Collection evicted before fetch completed");
            return result.map(|_| ()).map_err(CacheError::from);
        };

        if collection.in_flight == Some(fetch.seq) {
            collection.in_flight = None;
        }
        if fetch.seq <= collection.applied_seq {
            tracing::trace!(key = %fetch.key, seq = fetch.seq, "Discarding out-of-order fetch");
            return result.map(|_| ()).map_err(CacheError::from);
        }

        match result {
            Ok(events) => {
                tracing::debug!(
                    key = %fetch.key,
                    seq = fetch.seq,
                    count = events.len(),
                    "Event collection refreshed"
                );
                collection.events = Some(Arc::new(events));
                collection.fetched_at = Some(Instant::now());
                collection.applied_seq = fetch.seq;
                collection.error = None;
                Ok(())
            }
            Err(err) => {
                collection.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Evicts collections of other principals that have not been used for `gc_time`.
    fn collect_garbage(&self, collections: &mut LruCache<String, Collection>, current: &str) {
        let expired: Vec<String> = collections
            .iter()
            .filter(|(key, collection)| {
                key.as_str() != current
                    && collection.in_flight.is_none()
                    && collection.last_used.elapsed() >= self.config.gc_time
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in expired {
            collections.pop(key.as_str());
            tracing::debug!(%key, "Evicted unused event collection");
        }
    }

    fn begin_mutation(&self, kind: MutationKind) -> Result<PendingGuard<'_>> {
        let flag = &self.pending[kind.index()];
        if flag.swap(true, Ordering::SeqCst) {
            tracing::debug!(%kind, "Rejected mutation, one already in progress");
            return Err(CacheError::MutationPending(kind));
        }
        Ok(PendingGuard { flag })
    }
}

/// Read-through cache of the signed-in principal's events.
///
/// Cheap to clone; clones share the same state. The query is keyed by the
/// session's principal and is inert while nobody is signed in.
pub struct EventCache<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for EventCache<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> EventCache<R>
where
    R: EventRepository + 'static,
{
    /// Creates a new event cache.
    ///
    /// # Arguments
    ///
    /// * `repository` - The remote event store
    /// * `session` - Supplies the current principal
    /// * `config` - Freshness, retry and retention settings
    pub fn new(repository: Arc<R>, session: Session, config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_principals).unwrap_or(NonZeroUsize::MIN);
        let (in_flight, _) = watch::channel(0);

        Self {
            inner: Arc::new(Inner {
                repository,
                session,
                config,
                collections: Mutex::new(LruCache::new(capacity)),
                fetch_seq: AtomicU64::new(0),
                in_flight: Arc::new(in_flight),
                pending: Default::default(),
            }),
        }
    }

    /// Returns the principal's events.
    ///
    /// Fresh data is returned as-is. With no data the call waits for the
    /// repository. With stale data the call returns it flagged
    /// [`QueryStatus::Revalidating`] and refetches in the background.
    pub async fn list(&self) -> Result<EventsSnapshot> {
        let Some(principal) = self.inner.session.principal() else {
            tracing::trace!("No principal, event query disabled");
            return Ok(EventsSnapshot::disabled());
        };
        let key = events_key(&principal);
        let stale_time = self.inner.config.stale_time;

        let fetch = {
            let mut collections = self.inner.collections.lock().await;
            self.inner.collect_garbage(&mut collections, &key);
            let collection = collections.get_or_insert_mut(key.clone(), Collection::new);
            collection.last_used = Instant::now();

            if collection.events.is_some() {
                if collection.is_fresh(stale_time) {
                    tracing::trace!(%key, "Cache hit for events");
                } else if !collection.has_current_fetch() {
                    tracing::trace!(%key, "Stale events, revalidating in background");
                    let fetch = self.inner.start_fetch(&key, collection);
                    self.spawn_fetch(fetch);
                }
                return Ok(collection.snapshot(stale_time));
            }

            tracing::trace!(%key, "Cache miss for events");
            self.inner.start_fetch(&key, collection)
        };

        self.inner.run_fetch(fetch).await?;
        Ok(self.snapshot_for(&key).await)
    }

    /// Current state without triggering a fetch.
    pub async fn snapshot(&self) -> EventsSnapshot {
        match self.inner.session.principal() {
            Some(principal) => self.snapshot_for(&events_key(&principal)).await,
            None => EventsSnapshot::disabled(),
        }
    }

    /// Fetches now and waits for the result, whatever the freshness.
    pub async fn refetch(&self) -> Result<EventsSnapshot> {
        let Some(principal) = self.inner.session.principal() else {
            return Ok(EventsSnapshot::disabled());
        };
        let key = events_key(&principal);

        let fetch = {
            let mut collections = self.inner.collections.lock().await;
            let collection = collections.get_or_insert_mut(key.clone(), Collection::new);
            collection.last_used = Instant::now();
            self.inner.start_fetch(&key, collection)
        };

        self.inner.run_fetch(fetch).await?;
        Ok(self.snapshot_for(&key).await)
    }

    /// Waits until no fetch is in flight.
    pub async fn settled(&self) {
        let mut receiver = self.inner.in_flight.subscribe();
        let _ = receiver.wait_for(|count| *count == 0).await;
    }

    /// Whether a mutation of `kind` is running.
    pub fn is_pending(&self, kind: MutationKind) -> bool {
        self.inner.pending[kind.index()].load(Ordering::SeqCst)
    }

    /// Creates an event and invalidates the collection.
    pub async fn add(&self, event: NewEvent) -> Result<Event> {
        let principal = self
            .inner
            .session
            .principal()
            .ok_or(CacheError::NotAuthenticated)?;
        let _pending = self.inner.begin_mutation(MutationKind::Add)?;

        let created = self
            .inner
            .repository
            .create_event(&event)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Failed to add event");
                CacheError::from(err)
            })?;

        tracing::debug!(event_id = %created.id, "Event added");
        self.invalidate(&events_key(&principal)).await;
        Ok(created)
    }

    /// Updates an event and invalidates the collection.
    ///
    /// `updated_at` on the outgoing patch is set to the current time.
    pub async fn update(&self, mut patch: EventPatch) -> Result<Event> {
        let principal = self
            .inner
            .session
            .principal()
            .ok_or(CacheError::NotAuthenticated)?;
        let _pending = self.inner.begin_mutation(MutationKind::Update)?;

        patch.changes.updated_at = Some(format_timestamp(Utc::now()));
        let updated = self
            .inner
            .repository
            .update_event(&patch)
            .await
            .map_err(|err| {
                tracing::warn!(event_id = %patch.id, error = %err, "Failed to update event");
                CacheError::from(err)
            })?;

        tracing::debug!(event_id = %updated.id, "Event updated");
        self.invalidate(&events_key(&principal)).await;
        Ok(updated)
    }

    /// Deletes an event and invalidates the collection.
    pub async fn remove(&self, event_id: &str) -> Result<()> {
        let principal = self
            .inner
            .session
            .principal()
            .ok_or(CacheError::NotAuthenticated)?;
        let _pending = self.inner.begin_mutation(MutationKind::Remove)?;

        self.inner
            .repository
            .delete_event(event_id)
            .await
            .map_err(|err| {
                tracing::warn!(%event_id, error = %err, "Failed to delete event");
                CacheError::from(err)
            })?;

        tracing::debug!(%event_id, "Event deleted");
        self.invalidate(&events_key(&principal)).await;
        Ok(())
    }

    async fn snapshot_for(&self, key: &str) -> EventsSnapshot {
        let collections = self.inner.collections.lock().await;
        collections
            .peek(key)
            .map(|collection| collection.snapshot(self.inner.config.stale_time))
            .unwrap_or_else(|| EventsSnapshot::new(Arc::default(), QueryStatus::Loading))
    }

    /// Marks the collection stale and starts a refetch.
    async fn invalidate(&self, key: &str) {
        let mut collections = self.inner.collections.lock().await;
        let Some(collection) = collections.peek_mut(key) else {
            tracing::trace!(%key, "Nothing cached to invalidate");
            return;
        };

        collection.invalidated_seq = self.inner.fetch_seq.load(Ordering::SeqCst);
        tracing::debug!(%key, "Invalidated event collection");

        let fetch = self.inner.start_fetch(key, collection);
        self.spawn_fetch(fetch);
    }

    fn spawn_fetch(&self, fetch: Fetch) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let key = fetch.key.clone();
            if let Err(err) = inner.run_fetch(fetch).await {
                tracing::warn!(%key, error = %err, "Background event refetch failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use super::*;
    use crate::calendar::{parse_timestamp, EventChanges};

    /// Mock repository that counts calls and can delay or fail them.
    ///
    /// `list_events` snapshots the rows when called and then sleeps, so a slow
    /// fetch returns the state from when it started.
    #[derive(Default)]
    struct MockRepository {
        events: RwLock<Vec<Event>>,
        list_calls: AtomicUsize,
        create_calls: AtomicUsize,
        update_calls: AtomicUsize,
        delete_calls: AtomicUsize,
        list_failures: AtomicUsize,
        list_delays: RwLock<VecDeque<Duration>>,
        write_delay: RwLock<Duration>,
        write_failure: RwLock<Option<String>>,
        last_patch: RwLock<Option<EventPatch>>,
    }

    impl MockRepository {
        fn with_events(events: Vec<Event>) -> Self {
            Self {
                events: RwLock::new(events),
                ..Self::default()
            }
        }

        fn list_count(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }

        async fn fail_writes(&self, message: &str) {
            *self.write_failure.write().await = Some(message.to_string());
        }

        async fn write_result(&self) -> crate::storage::Result<()> {
            let delay = *self.write_delay.read().await;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match self.write_failure.read().await.clone() {
                Some(message) => Err(RepositoryError::Rejected(message)),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl EventRepository for MockRepository {
        async fn list_events(&self) -> crate::storage::Result<Vec<Event>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let rows = self.events.read().await.clone();
            let delay = self.list_delays.write().await.pop_front();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let failures = self.list_failures.load(Ordering::SeqCst);
            if failures > 0 {
                self.list_failures.store(failures - 1, Ordering::SeqCst);
                return Err(RepositoryError::ConnectionFailed(
                    "connection refused".to_string(),
                ));
            }
            Ok(rows)
        }

        async fn create_event(&self, event: &NewEvent) -> crate::storage::Result<Event> {
            let n = self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.write_result().await?;
            let created = event
                .clone()
                .into_event(format!("evt-{n}"), "2025-05-01T00:00:00.000Z");
            self.events.write().await.push(created.clone());
            Ok(created)
        }

        async fn update_event(&self, patch: &EventPatch) -> crate::storage::Result<Event> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_patch.write().await = Some(patch.clone());
            self.write_result().await?;

            let mut events = self.events.write().await;
            let event = events
                .iter_mut()
                .find(|event| event.id == patch.id)
                .ok_or_else(|| RepositoryError::NotFound {
                    entity_type: "Event",
                    id: patch.id.clone(),
                })?;
            patch.changes.clone().apply_to(event);
            Ok(event.clone())
        }

        async fn delete_event(&self, id: &str) -> crate::storage::Result<()> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.write_result().await?;
            self.events.write().await.retain(|event| event.id != id);
            Ok(())
        }
    }

    fn new_event(title: &str) -> NewEvent {
        NewEvent {
            user_id: "u1".to_string(),
            title: title.to_string(),
            description: None,
            location: None,
            start_time: "2025-05-10T09:00:00.000Z".to_string(),
            end_time: "2025-05-10T10:00:00.000Z".to_string(),
            is_all_day: false,
            time_zone: "UTC".to_string(),
            rrule: None,
            recurrence_end: None,
            exdates: None,
        }
    }

    fn make_event(id: &str, title: &str) -> Event {
        new_event(title).into_event(id, "2025-05-01T00:00:00.000Z")
    }

    fn rename(id: &str, title: &str) -> EventPatch {
        EventPatch::new(
            id,
            EventChanges {
                title: Some(title.to_string()),
                ..EventChanges::default()
            },
        )
    }

    fn make_cache(
        repository: MockRepository,
        config: CacheConfig,
    ) -> (Arc<MockRepository>, Session, EventCache<MockRepository>) {
        let repository = Arc::new(repository);
        let session = Session::signed_in("u1");
        let cache = EventCache::new(Arc::clone(&repository), session.clone(), config);
        (repository, session, cache)
    }

    #[tokio::test]
    async fn test_list_without_principal_is_inert() {
        let repository = Arc::new(MockRepository::with_events(vec![make_event("e1", "A")]));
        let cache = EventCache::new(
            Arc::clone(&repository),
            Session::new(),
            CacheConfig::default(),
        );

        let snapshot = cache.list().await.unwrap();

        assert_eq!(snapshot.status, QueryStatus::Disabled);
        assert!(snapshot.events().is_empty());
        assert_eq!(repository.list_count(), 0);
    }

    #[tokio::test]
    async fn test_first_list_loads_then_hits_cache() {
        let (repository, _session, cache) = make_cache(
            MockRepository::with_events(vec![make_event("e1", "A")]),
            CacheConfig::default(),
        );

        let first = cache.list().await.unwrap();
        let second = cache.list().await.unwrap();

        assert_eq!(first.status, QueryStatus::Fresh);
        assert_eq!(first.events().len(), 1);
        assert_eq!(second, first);
        assert_eq!(repository.list_count(), 1);
    }

    #[tokio::test]
    async fn test_stale_data_is_returned_while_revalidating() {
        let (repository, _session, cache) = make_cache(
            MockRepository::with_events(vec![make_event("e1", "Old")]),
            CacheConfig::default().with_stale_time(Duration::ZERO),
        );
        cache.list().await.unwrap();
        repository.events.write().await[0].title = "New".to_string();

        let stale = cache.list().await.unwrap();
        assert_eq!(stale.status, QueryStatus::Revalidating);
        assert_eq!(stale.events()[0].title, "Old");

        cache.settled().await;
        let refreshed = cache.snapshot().await;
        assert_eq!(refreshed.events()[0].title, "New");
        assert_eq!(refreshed.status, QueryStatus::Stale);
        assert_eq!(repository.list_count(), 2);
    }

    #[tokio::test]
    async fn test_only_one_background_refetch_at_a_time() {
        let repository = MockRepository::with_events(vec![make_event("e1", "A")]);
        repository
            .list_delays
            .write()
            .await
            .extend([Duration::ZERO, Duration::from_millis(50)]);
        let (repository, _session, cache) = make_cache(
            repository,
            CacheConfig::default().with_stale_time(Duration::ZERO),
        );
        cache.list().await.unwrap();

        cache.list().await.unwrap();
        cache.list().await.unwrap();
        cache.list().await.unwrap();
        cache.settled().await;

        assert_eq!(repository.list_count(), 2);
    }

    #[tokio::test]
    async fn test_read_is_retried_once() {
        let repository = MockRepository::with_events(vec![make_event("e1", "A")]);
        repository.list_failures.store(1, Ordering::SeqCst);
        let (repository, _session, cache) = make_cache(repository, CacheConfig::default());

        let snapshot = cache.list().await.unwrap();

        assert_eq!(snapshot.events().len(), 1);
        assert_eq!(repository.list_count(), 2);
    }

    #[tokio::test]
    async fn test_read_error_surfaces_after_retries() {
        let repository = MockRepository::default();
        repository.list_failures.store(2, Ordering::SeqCst);
        let (repository, _session, cache) = make_cache(repository, CacheConfig::default());

        let result = cache.list().await;

        assert_eq!(
            result.unwrap_err().to_string(),
            "Connection failed: connection refused"
        );
        assert_eq!(repository.list_count(), 2);
        assert_eq!(
            cache.snapshot().await.error(),
            Some("Connection failed: connection refused")
        );

        let recovered = cache.refetch().await.unwrap();
        assert_eq!(recovered.status, QueryStatus::Fresh);
        assert_eq!(repository.list_count(), 3);
    }

    #[tokio::test]
    async fn test_read_retries_can_be_disabled() {
        let repository = MockRepository::default();
        repository.list_failures.store(1, Ordering::SeqCst);
        let (repository, _session, cache) =
            make_cache(repository, CacheConfig::default().with_read_retries(0));

        assert!(cache.list().await.is_err());
        assert_eq!(repository.list_count(), 1);
    }

    #[tokio::test]
    async fn test_add_invalidates_and_refetches() {
        let (repository, _session, cache) = make_cache(
            MockRepository::with_events(vec![make_event("e1", "A")]),
            CacheConfig::default(),
        );
        cache.list().await.unwrap();

        let created = cache.add(new_event("B")).await.unwrap();
        cache.settled().await;

        let snapshot = cache.list().await.unwrap();
        assert_eq!(snapshot.status, QueryStatus::Fresh);
        assert!(snapshot.events().iter().any(|e| e.id == created.id));
        assert_eq!(repository.list_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched_and_is_not_retried() {
        let (repository, _session, cache) = make_cache(
            MockRepository::with_events(vec![make_event("e1", "A")]),
            CacheConfig::default(),
        );
        cache.list().await.unwrap();
        repository
            .fail_writes("new row violates row-level security policy")
            .await;

        let result = cache.add(new_event("B")).await;

        assert_eq!(
            result.unwrap_err().to_string(),
            "new row violates row-level security policy"
        );
        assert_eq!(repository.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(repository.list_count(), 1);
        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot.status, QueryStatus::Fresh);
        assert_eq!(snapshot.events().len(), 1);
        assert!(!cache.is_pending(MutationKind::Add));
    }

    #[tokio::test]
    async fn test_update_stamps_updated_at() {
        let (repository, _session, cache) = make_cache(
            MockRepository::with_events(vec![make_event("e1", "A")]),
            CacheConfig::default(),
        );

        let updated = cache.update(rename("e1", "Renamed")).await.unwrap();

        assert_eq!(updated.title, "Renamed");
        let patch = repository.last_patch.read().await.clone().unwrap();
        let stamped = patch.changes.updated_at.unwrap();
        assert!(parse_timestamp(&stamped, chrono_tz::UTC).is_some());
        assert!(stamped.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_remove_invalidates() {
        let (repository, _session, cache) = make_cache(
            MockRepository::with_events(vec![make_event("e1", "A"), make_event("e2", "B")]),
            CacheConfig::default(),
        );
        cache.list().await.unwrap();

        cache.remove("e1").await.unwrap();
        cache.settled().await;

        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot.events().len(), 1);
        assert_eq!(snapshot.events()[0].id, "e2");
        assert_eq!(repository.delete_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_mutation_of_same_kind_is_rejected_while_pending() {
        let repository = MockRepository::default();
        *repository.write_delay.write().await = Duration::from_millis(50);
        let (repository, _session, cache) = make_cache(repository, CacheConfig::default());

        let first = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.add(new_event("First")).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(cache.is_pending(MutationKind::Add));
        assert!(!cache.is_pending(MutationKind::Update));
        let second = cache.add(new_event("Second")).await;
        assert_eq!(
            second.unwrap_err(),
            CacheError::MutationPending(MutationKind::Add)
        );

        first.await.unwrap().unwrap();
        assert!(!cache.is_pending(MutationKind::Add));
        assert_eq!(repository.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mutation_without_principal_is_rejected() {
        let (repository, session, cache) =
            make_cache(MockRepository::default(), CacheConfig::default());
        session.sign_out();

        let result = cache.remove("e1").await;

        assert_eq!(result.unwrap_err(), CacheError::NotAuthenticated);
        assert_eq!(repository.delete_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_out_of_order_refetch_is_discarded() {
        let repository = MockRepository::with_events(vec![make_event("e1", "Original")]);
        repository.list_delays.write().await.extend([
            Duration::ZERO,
            Duration::from_millis(80),
            Duration::ZERO,
        ]);
        let (repository, _session, cache) = make_cache(repository, CacheConfig::default());
        cache.list().await.unwrap();

        cache.update(rename("e1", "First")).await.unwrap();
        cache.update(rename("e1", "Second")).await.unwrap();
        cache.settled().await;

        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot.events()[0].title, "Second");
        assert_eq!(snapshot.status, QueryStatus::Fresh);
        assert_eq!(repository.list_count(), 3);
    }

    #[tokio::test]
    async fn test_collections_are_keyed_by_principal() {
        let (repository, session, cache) = make_cache(
            MockRepository::with_events(vec![make_event("e1", "A")]),
            CacheConfig::default(),
        );
        cache.list().await.unwrap();

        session.sign_in("u2");
        cache.list().await.unwrap();
        assert_eq!(repository.list_count(), 2);

        session.sign_in("u1");
        assert_eq!(cache.list().await.unwrap().status, QueryStatus::Fresh);
        assert_eq!(repository.list_count(), 2);
    }

    #[tokio::test]
    async fn test_unused_collections_are_collected() {
        let (repository, session, cache) = make_cache(
            MockRepository::with_events(vec![make_event("e1", "A")]),
            CacheConfig::default().with_gc_time(Duration::ZERO),
        );
        cache.list().await.unwrap();

        session.sign_in("u2");
        cache.list().await.unwrap();
        session.sign_in("u1");
        cache.list().await.unwrap();

        assert_eq!(repository.list_count(), 3);
    }

    #[tokio::test]
    async fn test_snapshot_never_fetches() {
        let (repository, _session, cache) =
            make_cache(MockRepository::default(), CacheConfig::default());

        let snapshot = cache.snapshot().await;

        assert!(snapshot.is_loading());
        assert_eq!(repository.list_count(), 0);
    }
}
