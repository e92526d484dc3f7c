//! Event form state machine.
//!
//! The form is either creating a new event or editing an existing one, and is
//! either open or closed. It starts closed in create mode.

use std::time::Instant;

use chrono::NaiveDate;
use chrono_tz::Tz;

use super::{EventDraft, FormError, SubmitError};
use crate::cache::{EventCache, MutationKind};
use crate::calendar::{today, Event, EventChanges, EventPatch, NewEvent, SelectionState};
use crate::config::FormConfig;
use crate::session::{PrincipalId, Session};
use crate::storage::EventRepository;

/// Whether the form creates a new event or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Edit(Box<Event>),
}

/// A validated payload, routed by form mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(NewEvent),
    Update(EventPatch),
}

impl Submission {
    pub fn kind(&self) -> MutationKind {
        match self {
            Submission::Create(_) => MutationKind::Add,
            Submission::Update(_) => MutationKind::Update,
        }
    }
}

/// Add/edit event form.
#[derive(Debug, Clone)]
pub struct EventForm {
    config: FormConfig,
    zone: Tz,
    open: bool,
    mode: FormMode,
    draft: EventDraft,
    error: Option<String>,
    /// Last calendar selection seen, used when the fields are reset.
    selected: Option<NaiveDate>,
    /// Deadline of a scheduled reset after closing.
    reset_at: Option<Instant>,
}

impl EventForm {
    /// Creates a closed form in create mode, presenting times in `zone`.
    pub fn new(config: FormConfig, zone: Tz) -> Self {
        let draft = EventDraft::with_defaults(None, &config);
        Self {
            config,
            zone,
            open: false,
            mode: FormMode::Create,
            draft,
            error: None,
            selected: None,
            reset_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// The event being edited, if any.
    pub fn editing(&self) -> Option<&Event> {
        match &self.mode {
            FormMode::Create => None,
            FormMode::Edit(event) => Some(event.as_ref()),
        }
    }

    pub fn draft(&self) -> &EventDraft {
        &self.draft
    }

    /// The working day of the form, independent of the calendar selection.
    pub fn working_date(&self) -> Option<NaiveDate> {
        self.draft.date
    }

    /// The single active error message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.draft.location = location.into();
    }

    pub fn set_start_time(&mut self, start_time: impl Into<String>) {
        self.draft.start_time = start_time.into();
    }

    pub fn set_end_time(&mut self, end_time: impl Into<String>) {
        self.draft.end_time = end_time.into();
    }

    /// Opens the form for a new event on the selected day.
    ///
    /// With nothing selected, today is used and also selected in `selection`.
    pub fn open_add(&mut self, selection: &mut SelectionState) {
        let date = match selection.selected_date() {
            Some(date) => date,
            None => {
                let date = today(self.zone);
                selection.select_date(Some(date));
                date
            }
        };
        self.selected = Some(date);
        self.reset_at = None;
        self.reset_fields();
        self.open = true;
        tracing::debug!(%date, "Opened event form for a new event");
    }

    /// Opens the form on an existing event.
    ///
    /// Times come from the event in the form's zone. Unparsable times fall back
    /// to the defaults and never prevent opening.
    pub fn open_edit(&mut self, event: &Event, selection: &SelectionState) {
        self.selected = selection.selected_date();
        let fallback = self.selected.unwrap_or_else(|| today(self.zone));

        self.reset_at = None;
        self.draft = EventDraft::from_event(event, fallback, self.zone, &self.config);
        self.mode = FormMode::Edit(Box::new(event.clone()));
        self.error = None;
        self.open = true;
        tracing::debug!(event_id = %event.id, "Opened event form for editing");
    }

    /// Follows the calendar selection.
    ///
    /// In create mode, or while closed, the working day follows the selection
    /// and an open form gets the default times again. An open edit is left
    /// alone.
    pub fn on_selection_changed(&mut self, date: Option<NaiveDate>) {
        self.selected = date;
        match (&self.mode, self.open) {
            (FormMode::Edit(_), true) => {}
            (FormMode::Create, true) if date.is_some() => self.draft.reseed(date, &self.config),
            _ => self.draft.date = date,
        }
    }

    /// Closes the form and schedules a reset after the configured delay.
    ///
    /// Calling it again while a reset is scheduled changes nothing.
    pub fn close_and_reset(&mut self) {
        self.open = false;
        if self.reset_at.is_none() {
            self.reset_at = Some(Instant::now() + self.config.reset_delay);
        }
    }

    /// Whether a reset is scheduled and not yet applied.
    pub fn reset_pending(&self) -> bool {
        self.reset_at.is_some()
    }

    /// Applies a scheduled reset once `now` has reached its deadline.
    ///
    /// Returns whether the reset was applied.
    pub fn poll_reset(&mut self, now: Instant) -> bool {
        match self.reset_at {
            Some(deadline) if now >= deadline => {
                self.reset_at = None;
                self.reset_fields();
                true
            }
            _ => false,
        }
    }

    /// Waits for a scheduled reset and applies it.
    pub async fn finish_reset(&mut self) {
        if let Some(deadline) = self.reset_at {
            tokio::time::sleep_until(deadline.into()).await;
            self.poll_reset(deadline);
        }
    }

    /// Validates the fields and builds the payload for the current mode.
    pub fn submission(&self, principal: Option<&PrincipalId>) -> Result<Submission, FormError> {
        let payload = self.draft.build_payload(principal, self.zone)?;
        Ok(match &self.mode {
            FormMode::Create => Submission::Create(payload),
            FormMode::Edit(event) => Submission::Update(EventPatch::new(
                event.id.clone(),
                EventChanges::from_new_event(payload),
            )),
        })
    }

    /// Validates and dispatches to the cache.
    ///
    /// On failure the message is kept in [`EventForm::error`] and the form
    /// stays open. Closing after success is up to the caller.
    pub async fn submit<R>(
        &mut self,
        session: &Session,
        cache: &EventCache<R>,
    ) -> Result<Event, SubmitError>
    where
        R: EventRepository + 'static,
    {
        self.error = None;

        let principal = session.principal();
        let submission = match self.submission(principal.as_ref()) {
            Ok(submission) => submission,
            Err(err) => {
                tracing::debug!(error = %err, "Event form rejected");
                self.error = Some(err.to_string());
                return Err(err.into());
            }
        };

        let kind = submission.kind();
        let result = match submission {
            Submission::Create(event) => cache.add(event).await,
            Submission::Update(patch) => cache.update(patch).await,
        };

        result.map_err(|source| {
            let err = SubmitError::Mutation { kind, source };
            self.error = Some(err.to_string());
            err
        })
    }

    fn reset_fields(&mut self) {
        let date = self.selected.unwrap_or_else(|| today(self.zone));
        self.draft = EventDraft::with_defaults(Some(date), &self.config);
        self.mode = FormMode::Create;
        self.error = None;
    }
}
