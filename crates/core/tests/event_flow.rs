use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Asia::Singapore;
use chrono_tz::UTC;
use tokio::sync::Mutex;

use eventsync_core::storage::{InMemoryRepository, Result as RepositoryResult};
use eventsync_core::{
    CacheConfig, Event, EventCache, EventForm, EventPatch, EventRepository, FormConfig, FormError,
    NewEvent, QueryStatus, SelectionState, Session, SubmitError,
};

/// In-memory repository that counts list calls and can hold individual lists back.
struct CountingRepository {
    inner: InMemoryRepository,
    list_calls: AtomicUsize,
    list_delays: Mutex<VecDeque<Duration>>,
}

impl CountingRepository {
    fn new(session: Session) -> Self {
        Self {
            inner: InMemoryRepository::new(session),
            list_calls: AtomicUsize::new(0),
            list_delays: Mutex::new(VecDeque::new()),
        }
    }

    fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventRepository for CountingRepository {
    async fn list_events(&self) -> RepositoryResult<Vec<Event>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.inner.list_events().await;
        let delay = self.list_delays.lock().await.pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        rows
    }

    async fn create_event(&self, event: &NewEvent) -> RepositoryResult<Event> {
        self.inner.create_event(event).await
    }

    async fn update_event(&self, patch: &EventPatch) -> RepositoryResult<Event> {
        self.inner.update_event(patch).await
    }

    async fn delete_event(&self, id: &str) -> RepositoryResult<()> {
        self.inner.delete_event(id).await
    }
}

struct Harness {
    session: Session,
    repository: Arc<CountingRepository>,
    cache: EventCache<CountingRepository>,
    selection: SelectionState,
    form: EventForm,
}

fn make_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn harness(session: Session, zone: chrono_tz::Tz) -> Harness {
    let repository = Arc::new(CountingRepository::new(session.clone()));
    let cache = EventCache::new(
        Arc::clone(&repository),
        session.clone(),
        CacheConfig::default(),
    );
    Harness {
        session,
        repository,
        cache,
        selection: SelectionState::new(make_date(2025, 5, 10)),
        form: EventForm::new(FormConfig::default(), zone),
    }
}

fn seeded_event(id: &str, start: &str, end: &str) -> Event {
    NewEvent {
        user_id: "u1".to_string(),
        title: "Seeded".to_string(),
        description: None,
        location: None,
        start_time: start.to_string(),
        end_time: end.to_string(),
        is_all_day: false,
        time_zone: "UTC".to_string(),
        rrule: None,
        recurrence_end: None,
        exdates: None,
    }
    .into_event(id, "2025-05-01T00:00:00.000Z")
}

#[tokio::test]
async fn signed_out_list_never_reaches_repository() {
    let h = harness(Session::new(), UTC);

    let snapshot = h.cache.list().await.unwrap();

    assert_eq!(snapshot.status, QueryStatus::Disabled);
    assert!(snapshot.events().is_empty());
    assert_eq!(h.repository.list_count(), 0);
}

#[tokio::test]
async fn create_standup_stores_utc_instants() {
    let mut h = harness(Session::signed_in("u1"), Singapore);
    h.cache.list().await.unwrap();

    h.form.open_add(&mut h.selection);
    h.form.set_title("Standup");
    h.form.set_start_time("09:00");
    h.form.set_end_time("10:00");
    let created = h.form.submit(&h.session, &h.cache).await.unwrap();
    h.form.close_and_reset();

    assert_eq!(created.start_time, "2025-05-10T01:00:00.000Z");
    assert_eq!(created.end_time, "2025-05-10T02:00:00.000Z");
    assert!(!created.is_all_day);
    assert_eq!(created.time_zone, "Asia/Singapore");
    assert_eq!(created.user_id, "u1");

    h.cache.settled().await;
    let snapshot = h.cache.list().await.unwrap();
    let day = snapshot.events_on(make_date(2025, 5, 10), Singapore);
    assert_eq!(day.len(), 1);
    assert_eq!(day[0].id, created.id);
}

#[tokio::test]
async fn edit_of_unparsable_event_opens_with_default_start() {
    let mut h = harness(Session::signed_in("u1"), UTC);
    h.repository
        .inner
        .seed(seeded_event("broken", "yesterday-ish", "2025-05-10T10:00:00Z"))
        .await;

    let snapshot = h.cache.list().await.unwrap();
    assert!(snapshot.events_on(make_date(2025, 5, 10), UTC).is_empty());

    let event = snapshot.events()[0].clone();
    h.form.open_edit(&event, &h.selection);

    assert!(h.form.is_open());
    assert_eq!(h.form.draft().start_time, "12:00");
    assert_eq!(h.form.draft().end_time, "10:00");
    assert_eq!(h.form.working_date(), Some(make_date(2025, 5, 10)));
}

#[tokio::test]
async fn sequential_edits_converge_on_last_write() {
    let mut h = harness(Session::signed_in("u1"), UTC);
    h.repository
        .inner
        .seed(seeded_event(
            "e1",
            "2025-05-10T09:00:00.000Z",
            "2025-05-10T10:00:00.000Z",
        ))
        .await;
    let snapshot = h.cache.list().await.unwrap();
    let event = snapshot.events()[0].clone();

    // The refetch after the first edit answers slowly with pre-second-edit rows.
    h.repository
        .list_delays
        .lock()
        .await
        .extend([Duration::from_millis(80), Duration::ZERO]);

    h.form.open_edit(&event, &h.selection);
    h.form.set_title("First");
    h.form.submit(&h.session, &h.cache).await.unwrap();

    h.form.open_edit(&event, &h.selection);
    h.form.set_title("Second");
    h.form.submit(&h.session, &h.cache).await.unwrap();

    h.cache.settled().await;
    let snapshot = h.cache.snapshot().await;
    assert_eq!(snapshot.status, QueryStatus::Fresh);
    assert_eq!(snapshot.events().len(), 1);
    assert_eq!(snapshot.events()[0].title, "Second");
}

#[tokio::test]
async fn unchanged_edit_round_trips_date_and_times() {
    let mut h = harness(Session::signed_in("u1"), Singapore);
    h.form.open_add(&mut h.selection);
    h.form.set_title("Review");
    h.form.set_start_time("14:15");
    h.form.set_end_time("15:45");
    let created = h.form.submit(&h.session, &h.cache).await.unwrap();
    h.form.close_and_reset();
    h.form.finish_reset().await;

    h.selection.select_date(Some(make_date(2025, 6, 1)));
    h.form.on_selection_changed(h.selection.selected_date());
    h.form.open_edit(&created, &h.selection);
    let updated = h.form.submit(&h.session, &h.cache).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.start_time, created.start_time);
    assert_eq!(updated.end_time, created.end_time);
    assert_ne!(updated.updated_at, created.updated_at);
}

#[tokio::test]
async fn overnight_range_is_rejected_before_any_write() {
    let mut h = harness(Session::signed_in("u1"), UTC);
    h.form.open_add(&mut h.selection);
    h.form.set_title("Late shift");
    h.form.set_start_time("23:30");
    h.form.set_end_time("00:30");

    let result = h.form.submit(&h.session, &h.cache).await;

    assert_eq!(
        result.unwrap_err(),
        SubmitError::Validation(FormError::EndNotAfterStart)
    );
    assert!(h.repository.inner.is_empty().await);
    assert!(h.form.is_open());
}

#[tokio::test]
async fn principals_only_see_and_touch_their_own_events() {
    let mut h = harness(Session::signed_in("u1"), UTC);
    h.form.open_add(&mut h.selection);
    h.form.set_title("Private");
    let created = h.form.submit(&h.session, &h.cache).await.unwrap();
    h.cache.settled().await;

    h.session.sign_in("u2");
    let snapshot = h.cache.list().await.unwrap();
    assert!(snapshot.events().is_empty());

    let result = h.cache.remove(&created.id).await;
    assert_eq!(
        result.unwrap_err().to_string(),
        format!("Event not found: {}", created.id)
    );

    h.session.sign_in("u1");
    let snapshot = h.cache.list().await.unwrap();
    assert_eq!(snapshot.events().len(), 1);
}
