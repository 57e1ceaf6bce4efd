//! Multi-step event creation/editing flow.
//!
//! The wizard owns an [`EventDraft`], tracks which step is active and how far
//! the user has progressed, gates forward navigation on per-step validation
//! and finally submits the draft through an [`EventsApi`].

mod draft;
mod payload;
mod validation;

use shared::{domain::EventId, protocol::EventRecord};
use tracing::{info, warn};

use crate::EventsApi;

pub use draft::{DraftPatch, EventDraft, Field, FieldErrors};
pub use payload::{build_payload, ONLINE_LOCATION};
pub use validation::MIN_TITLE_LEN;

pub const FIRST_STEP: u8 = 1;
pub const LAST_STEP: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Basics,
    Details,
    DateAndLocation,
    Settings,
    Media,
    Review,
}

impl Step {
    pub const ALL: [Step; LAST_STEP as usize] = [
        Step::Basics,
        Step::Details,
        Step::DateAndLocation,
        Step::Settings,
        Step::Media,
        Step::Review,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        index
            .checked_sub(FIRST_STEP)
            .and_then(|offset| Self::ALL.get(usize::from(offset)))
            .copied()
    }

    pub fn index(self) -> u8 {
        match self {
            Step::Basics => 1,
            Step::Details => 2,
            Step::DateAndLocation => 3,
            Step::Settings => 4,
            Step::Media => 5,
            Step::Review => 6,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Basics => "Basics",
            Step::Details => "Details",
            Step::DateAndLocation => "Date & location",
            Step::Settings => "Settings",
            Step::Media => "Media & tags",
            Step::Review => "Guests & review",
        }
    }
}

/// Whether submission creates a new event or updates an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit(EventId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved(EventId),
    /// The current step or the payload conversion failed; see `errors()`.
    Invalid,
    /// The API call failed; see `submit_error()`.
    Failed,
    /// Another submission is still running.
    Busy,
}

/// Holds the `is_submitting` flag for the duration of one API call and
/// lowers it again however the call ends, including the future being dropped.
struct SubmitGuard<'a> {
    flag: &'a mut bool,
}

impl<'a> SubmitGuard<'a> {
    fn acquire(flag: &'a mut bool) -> Option<Self> {
        if *flag {
            return None;
        }
        *flag = true;
        Some(Self { flag })
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

#[derive(Debug, Clone)]
pub struct EventWizard {
    mode: WizardMode,
    current_step: u8,
    max_step_reached: u8,
    draft: EventDraft,
    errors: FieldErrors,
    is_submitting: bool,
    submit_error: Option<String>,
}

impl Default for EventWizard {
    fn default() -> Self {
        Self::create()
    }
}

impl EventWizard {
    pub fn create() -> Self {
        Self {
            mode: WizardMode::Create,
            current_step: FIRST_STEP,
            max_step_reached: FIRST_STEP,
            draft: EventDraft::default(),
            errors: FieldErrors::new(),
            is_submitting: false,
            submit_error: None,
        }
    }

    /// Opens an existing event for editing. Every step is reachable right
    /// away since the stored event already went through the flow once.
    pub fn edit(record: &EventRecord) -> Self {
        Self {
            mode: WizardMode::Edit(record.id.clone()),
            current_step: FIRST_STEP,
            max_step_reached: LAST_STEP,
            draft: EventDraft::from_record(record),
            errors: FieldErrors::new(),
            is_submitting: false,
            submit_error: None,
        }
    }

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    pub fn max_step_reached(&self) -> u8 {
        self.max_step_reached
    }

    pub fn draft(&self) -> &EventDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step == LAST_STEP
    }

    /// Merges `patch` into the draft and drops the error of every field it
    /// touches. Errors come back only with the next validation pass.
    ///
    /// Returns the tag and guest entries that were rejected while merging.
    pub fn update_field(&mut self, patch: DraftPatch) -> Vec<String> {
        for field in patch.fields() {
            self.errors.remove(&field);
        }
        patch.apply(&mut self.draft)
    }

    /// Checks the rules of `step` against the draft and replaces the error
    /// map with what was found.
    pub fn validate_step(&mut self, step: u8) -> bool {
        self.errors = validation::validate_step(step, &self.draft);
        self.errors.is_empty()
    }

    /// Jumps to any step already reached; anything else is ignored.
    pub fn go_to_step(&mut self, step: u8) -> bool {
        if !(FIRST_STEP..=self.max_step_reached).contains(&step) {
            return false;
        }
        self.current_step = step;
        true
    }

    pub fn next_step(&mut self) -> bool {
        if !self.validate_step(self.current_step) || self.is_last_step() {
            return false;
        }
        self.current_step += 1;
        self.max_step_reached = self.max_step_reached.max(self.current_step);
        true
    }

    pub fn prev_step(&mut self) -> bool {
        if self.current_step <= FIRST_STEP {
            return false;
        }
        self.current_step -= 1;
        true
    }

    /// Validates every step in order, for drafts filled in one go. Stops on
    /// the first failing step with its errors in place; when all pass the
    /// wizard lands on the review step.
    pub fn validate_all(&mut self) -> bool {
        for step in FIRST_STEP..=LAST_STEP {
            if !self.validate_step(step) {
                self.max_step_reached = self.max_step_reached.max(step);
                self.current_step = step;
                return false;
            }
        }
        self.max_step_reached = LAST_STEP;
        self.current_step = LAST_STEP;
        true
    }

    /// Validates the current step, sends the draft and reports the outcome.
    ///
    /// On success `on_complete` receives the saved event's id and a wizard
    /// that was creating switches to editing that event, so submitting again
    /// updates it instead of creating a second one. On failure the message
    /// is kept in `submit_error` and the wizard stays where it is.
    pub async fn submit<A, F>(&mut self, api: &A, on_complete: F) -> SubmitOutcome
    where
        A: EventsApi + ?Sized,
        F: FnOnce(&EventId),
    {
        if self.is_submitting {
            return SubmitOutcome::Busy;
        }
        if !self.validate_step(self.current_step) {
            return SubmitOutcome::Invalid;
        }
        let payload = match build_payload(&self.draft) {
            Ok(payload) => payload,
            Err(errors) => {
                self.errors = errors;
                return SubmitOutcome::Invalid;
            }
        };

        self.submit_error = None;
        let result = {
            let Some(_guard) = SubmitGuard::acquire(&mut self.is_submitting) else {
                return SubmitOutcome::Busy;
            };
            match &self.mode {
                WizardMode::Create => {
                    info!(title = %payload.title, "submitting new event");
                    api.create_event(&payload).await
                }
                WizardMode::Edit(id) => {
                    info!(event_id = %id, "submitting event update");
                    api.update_event(id, &payload).await
                }
            }
        };

        match result {
            Ok(id) => {
                info!(event_id = %id, "event saved");
                self.mode = WizardMode::Edit(id.clone());
                on_complete(&id);
                SubmitOutcome::Saved(id)
            }
            Err(err) => {
                warn!(step = self.current_step, "event submission failed: {err}");
                self.submit_error = Some(err.to_string());
                SubmitOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/wizard_tests.rs"]
mod tests;
