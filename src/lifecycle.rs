//! Response lifecycle: which backend record holds the in-progress answers.
//!
//! A session starts `Fresh` with no record. The first create that returns an
//! id links the session to that record (`Linked`) and every later save is an
//! update. Completion finalizes the record and ends the session.

use crate::api::{Draft, FormTransport, SubmissionResponse, TransportError};
use crate::debounce::Debouncer;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What the user sees once the form is completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Redirect(String),
    ThankYou,
}

impl Outcome {
    /// Redirect when the backend names a target, thank-you otherwise.
    pub fn from_response(response: &SubmissionResponse) -> Self {
        match response.redirect_target() {
            Some(url) => Outcome::Redirect(url.to_string()),
            None => Outcome::ThankYou,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No record created yet
    Fresh,
    /// Backed by a server-side record
    Linked,
    /// `complete` was called; terminal
    Completed,
}

#[derive(Debug, Default)]
struct SessionState {
    record_id: Option<String>,
    pending_draft: Draft,
    completed: bool,
}

struct Shared {
    transport: Arc<dyn FormTransport>,
    form_key: String,
    state: Mutex<SessionState>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record_id(&self) -> Option<String> {
        self.state().record_id.clone()
    }

    /// Last writer wins; overlapping creates are not serialized.
    fn link(&self, record_id: String) {
        let mut state = self.state();
        match state.record_id.as_deref() {
            Some(existing) if existing != record_id => warn!(
                "Form '{}': record {} replaced by {} from a later create",
                self.form_key, existing, record_id
            ),
            Some(_) => {}
            None => info!("Form '{}': linked to record {}", self.form_key, record_id),
        }
        state.record_id = Some(record_id);
    }

    /// Best-effort save. Failures are logged and dropped.
    ///
    /// A no-op once the session is completed, including for an autosave
    /// whose timer fired before `complete` ran.
    async fn persist(&self, draft: Draft) {
        if self.form_key.is_empty() {
            return;
        }
        if self.state().completed {
            debug!("Form '{}': skipping save after completion", self.form_key);
            return;
        }

        if let Err(e) = self.try_persist(&draft).await {
            warn!("Form '{}': error saving incrementally: {}", self.form_key, e);
        }
    }

    async fn try_persist(&self, draft: &Draft) -> Result<(), TransportError> {
        match self.record_id() {
            Some(record_id) => {
                self.transport
                    .update_response(&self.form_key, &record_id, draft, false)
                    .await?;
                debug!("Form '{}': updated record {}", self.form_key, record_id);
            }
            None => {
                let response = self.transport.create_response(&self.form_key, draft).await?;
                match response.id {
                    Some(record_id) => self.link(record_id),
                    None => debug!("Form '{}': create returned no record id", self.form_key),
                }
            }
        }
        Ok(())
    }

    async fn finalize(&self, draft: &Draft) -> Result<SubmissionResponse, TransportError> {
        if let Some(record_id) = self.record_id() {
            return self
                .transport
                .update_response(&self.form_key, &record_id, draft, true)
                .await;
        }

        let created = self.transport.create_response(&self.form_key, draft).await?;
        match created.id.clone() {
            Some(record_id) => {
                self.link(record_id.clone());
                self.transport
                    .update_response(&self.form_key, &record_id, draft, true)
                    .await
            }
            None => Ok(created),
        }
    }
}

/// Owns the record identity of one form session and its autosave timer.
///
/// Dropping the lifecycle cancels a pending autosave; a save already in
/// flight still runs to completion.
pub struct ResponseLifecycle {
    shared: Arc<Shared>,
    autosave: Debouncer,
}

impl ResponseLifecycle {
    pub fn new(transport: Arc<dyn FormTransport>, form_key: &str, autosave_delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                transport,
                form_key: form_key.to_string(),
                state: Mutex::new(SessionState::default()),
            }),
            autosave: Debouncer::new(autosave_delay),
        }
    }

    pub fn form_key(&self) -> &str {
        &self.shared.form_key
    }

    pub fn record_id(&self) -> Option<String> {
        self.shared.record_id()
    }

    pub fn phase(&self) -> Phase {
        let state = self.shared.state();
        if state.completed {
            Phase::Completed
        } else if state.record_id.is_some() {
            Phase::Linked
        } else {
            Phase::Fresh
        }
    }

    /// Debounced save of the latest draft.
    ///
    /// The timer reads the pending draft when it fires, so a burst of calls
    /// results in one save carrying the last draft.
    pub fn schedule_autosave(&self, draft: Draft) {
        {
            let mut state = self.shared.state();
            if state.completed {
                debug!("Form '{}': ignoring autosave after completion", self.form_key());
                return;
            }
            state.pending_draft = draft;
        }

        let shared = Arc::clone(&self.shared);
        self.autosave.arm(move || async move {
            let draft = shared.state().pending_draft.clone();
            shared.persist(draft).await;
        });
    }

    /// Save immediately (partial submit). Failures are logged, not returned.
    pub async fn persist(&self, draft: Draft) {
        {
            let mut state = self.shared.state();
            if state.completed {
                debug!("Form '{}': ignoring save after completion", self.form_key());
                return;
            }
            state.pending_draft = draft.clone();
        }

        self.shared.persist(draft).await;
    }

    /// Finalize the response and decide what the user sees.
    ///
    /// Never fails: any transport error yields `Outcome::ThankYou`.
    pub async fn complete(&self, draft: Draft) -> Outcome {
        self.autosave.cancel();

        {
            let mut state = self.shared.state();
            if state.completed {
                warn!("Form '{}': already completed", self.form_key());
                return Outcome::ThankYou;
            }
            state.completed = true;
            state.pending_draft = draft.clone();
        }

        if self.form_key().is_empty() {
            return Outcome::ThankYou;
        }

        match self.shared.finalize(&draft).await {
            Ok(response) => {
                info!("Form '{}': submission completed", self.form_key());
                Outcome::from_response(&response)
            }
            Err(e) => {
                error!("Form '{}': error completing submission: {}", self.form_key(), e);
                Outcome::ThankYou
            }
        }
    }
}
