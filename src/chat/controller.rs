use std::fmt;

use super::input::InputBuffer;
use super::replies::{final_text, PLACEHOLDER_TEXT};
use super::transcript::{EntryHandle, Role, Surface, Transcript};
use crate::api::{AskError, AskResponse, AskService};

/// Identifies one issued `/ask` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The remote call a driver must issue after an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub request: RequestId,
    pub question: String,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Sending {
        request: RequestId,
        placeholder: EntryHandle,
    },
}

/// Single-flight submission state machine.
///
/// `submit` turns the input field into a user entry plus an assistant
/// placeholder and tells the caller which question to send; `settle` writes the
/// outcome into that placeholder. While a question is outstanding every further
/// submit is dropped.
#[derive(Debug)]
pub struct SubmissionController {
    phase: Phase,
    issued: u64,
}

impl Default for SubmissionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionController {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            issued: 0,
        }
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.phase, Phase::Sending { .. })
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_sending()
    }

    /// The outstanding call, if any.
    pub fn pending_request(&self) -> Option<RequestId> {
        match &self.phase {
            Phase::Sending { request, .. } => Some(*request),
            Phase::Idle => None,
        }
    }

    /// Handle a submit action. Returns `None` when the input is blank or a
    /// question is already outstanding; nothing is appended in either case.
    pub fn submit<S: Surface>(
        &mut self,
        input: &mut InputBuffer,
        transcript: &mut Transcript<S>,
    ) -> Option<Dispatch> {
        if let Phase::Sending { request, .. } = &self.phase {
            tracing::debug!(pending = %request, "submit ignored while a question is outstanding");
            return None;
        }

        if input.is_blank() {
            return None;
        }

        let question = input.take_trimmed();
        transcript.append(Role::User, question.as_str());
        let placeholder = transcript.append(Role::Assistant, PLACEHOLDER_TEXT);

        self.issued += 1;
        let request = RequestId(self.issued);
        self.phase = Phase::Sending {
            request,
            placeholder,
        };

        tracing::info!(%request, chars = question.chars().count(), "question submitted");
        Some(Dispatch { request, question })
    }

    /// Write the outcome of `request` into its placeholder and return to idle.
    ///
    /// Returns `false`, touching nothing, when `request` is not the outstanding
    /// call.
    pub fn settle<S: Surface>(
        &mut self,
        transcript: &mut Transcript<S>,
        request: RequestId,
        outcome: Result<AskResponse, AskError>,
    ) -> bool {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Sending {
                request: pending,
                placeholder,
            } if pending == request => {
                transcript.set_text(&placeholder, final_text(&outcome));
                match &outcome {
                    Ok(_) => tracing::info!(%request, "question settled"),
                    Err(err) => {
                        tracing::info!(%request, kind = err.kind(), "question settled with failure")
                    }
                }
                true
            }
            phase => {
                tracing::warn!(%request, "ignoring settlement for a question that is not outstanding");
                self.phase = phase;
                false
            }
        }
    }

    /// Submit, wait for `service` and settle in one go.
    ///
    /// Returns whether a question was actually sent.
    pub async fn submit_and_wait<S: Surface>(
        &mut self,
        input: &mut InputBuffer,
        transcript: &mut Transcript<S>,
        service: &dyn AskService,
    ) -> bool {
        let Some(dispatch) = self.submit(input, transcript) else {
            return false;
        };

        let outcome = service.ask(&dispatch.question).await;
        self.settle(transcript, dispatch.request, outcome)
    }
}
