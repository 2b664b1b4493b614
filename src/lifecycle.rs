//! Submission lifecycle state machine.
//!
//! `Idle -> Submitting -> {Succeeded | Failed}`, re-enterable through a new submit.
//! [`LifecycleController`] is the only writer of [`SubmissionState`].

use crate::download::{DownloadTrigger, FileSavePort, SavedFile};
use crate::error::GenerationError;
use crate::mode::{GenerationMode, GenerationTarget, ModeChange};
use crate::request::RequestDescriptor;
use crate::response::Outcome;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Current state exposed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded(Outcome),
    Failed(String),
}

impl SubmissionState {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Succeeded(_) => "succeeded",
            SubmissionState::Failed(_) => "failed",
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// What to do with a response that arrives after the user switched modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleResponsePolicy {
    /// Resolve state with the late response anyway
    #[default]
    Apply,
    /// Drop the late response and return to `Idle`
    Discard,
}

/// Identity of one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub id: u64,
    pub mode: GenerationMode,
    pub target: GenerationTarget,
}

/// Result of a submit event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Moved to `Submitting`; the request must now be sent
    Started {
        ticket: Ticket,
        request: RequestDescriptor,
    },
    /// A request is already in flight; nothing changed
    Rejected,
    /// Validation failed; moved to `Failed` without a request
    Invalid(GenerationError),
}

/// Result of resolving a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Applied { saved: Option<SavedFile> },
    Discarded,
}

#[derive(Debug, Default)]
pub struct LifecycleController {
    state: SubmissionState,
    in_flight: Option<Ticket>,
    next_id: u64,
    policy: StaleResponsePolicy,
}

impl LifecycleController {
    pub fn new(policy: StaleResponsePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    pub fn in_flight(&self) -> Option<&Ticket> {
        self.in_flight.as_ref()
    }

    /// Text of a successful inline result
    pub fn inline_result(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Succeeded(outcome) => outcome.inline_text(),
            _ => None,
        }
    }

    /// Handle a submit event. `build` runs only when no request is in flight.
    pub fn submit<F>(&mut self, mode: GenerationMode, build: F) -> SubmitDecision
    where
        F: FnOnce() -> Result<RequestDescriptor, GenerationError>,
    {
        if self.is_submitting() {
            debug!("Submit rejected: request already in flight");
            return SubmitDecision::Rejected;
        }

        match build() {
            Ok(request) => {
                self.next_id += 1;
                let ticket = Ticket {
                    id: self.next_id,
                    mode,
                    target: request.target,
                };
                self.transition(SubmissionState::Submitting);
                self.in_flight = Some(ticket);
                SubmitDecision::Started { ticket, request }
            }
            Err(err) => {
                self.transition(SubmissionState::Failed(err.to_string()));
                SubmitDecision::Invalid(err)
            }
        }
    }

    /// Resolve the in-flight submission with its outcome or transport error.
    ///
    /// A `FilePayload` is saved through `saver` as part of the transition.
    pub fn resolve(
        &mut self,
        ticket: &Ticket,
        result: Result<Outcome, GenerationError>,
        active_mode: GenerationMode,
        saver: &mut dyn FileSavePort,
    ) -> Resolution {
        if self.in_flight.as_ref() != Some(ticket) {
            warn!(ticket = ticket.id, "Ignoring response for a submission that is not in flight");
            return Resolution::Discarded;
        }
        self.in_flight = None;

        if ticket.mode != active_mode {
            match self.policy {
                StaleResponsePolicy::Discard => {
                    info!(
                        ticket = ticket.id,
                        submitted_mode = %ticket.mode,
                        active_mode = %active_mode,
                        "Discarding response for a mode no longer active"
                    );
                    self.transition(SubmissionState::Idle);
                    return Resolution::Discarded;
                }
                StaleResponsePolicy::Apply => {
                    debug!(ticket = ticket.id, "Applying response for a mode no longer active");
                }
            }
        }

        let outcome = result.unwrap_or_else(Outcome::from);
        match outcome {
            Outcome::Failure { message } => {
                self.transition(SubmissionState::Failed(message));
                Resolution::Applied { saved: None }
            }
            Outcome::FilePayload(payload) => match DownloadTrigger::save(saver, &payload) {
                Ok(saved) => {
                    self.transition(SubmissionState::Succeeded(Outcome::FilePayload(payload)));
                    Resolution::Applied { saved: Some(saved) }
                }
                Err(e) => {
                    self.transition(SubmissionState::Failed(format!("Download failed: {}", e)));
                    Resolution::Applied { saved: None }
                }
            },
            inline @ Outcome::InlineResult { .. } => {
                self.transition(SubmissionState::Succeeded(inline));
                Resolution::Applied { saved: None }
            }
        }
    }

    /// A mode change clears a finished submission; an in-flight one keeps running.
    pub fn on_mode_change(&mut self, change: ModeChange) {
        match self.state {
            SubmissionState::Succeeded(_) | SubmissionState::Failed(_) => {
                if change.left_code_gen() && self.inline_result().is_some() {
                    debug!("Discarding inline result on leaving code generation");
                }
                self.transition(SubmissionState::Idle);
            }
            SubmissionState::Idle | SubmissionState::Submitting => {}
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        debug!(from = self.state.name(), to = next.name(), "Submission state transition");
        self.state = next;
    }
}
