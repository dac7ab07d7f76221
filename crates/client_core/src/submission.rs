//! Submission attempt lifecycle. One attempt at a time walks
//! `Idle → Selecting → Sending → AwaitingResolution → Resolved`; pushes only
//! wake the controller up, the judge's verdict is always pulled.

use std::sync::Arc;

use shared::{
    domain::{SubmissionId, SubmissionStatus},
    protocol::{SubmitPayload, SubmitReply, SubmitRequest},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{ClientEvent, ContestGateway};

const FAILED_MESSAGE: &str = "Submission failed.";
const TIMED_OUT_MESSAGE: &str = "Execution timed out.";
const WON_MESSAGE: &str = "You won the language!";

/// Attempt body staged in the submission form. The enum keeps inline code
/// and an uploaded file mutually exclusive by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AttemptPayload {
    #[default]
    Empty,
    Inline(String),
    File(Vec<u8>),
}

impl AttemptPayload {
    /// Whether there is anything to send. Zero-length content counts as
    /// empty even when a form was touched.
    pub fn is_empty(&self) -> bool {
        match self {
            AttemptPayload::Empty => true,
            AttemptPayload::Inline(text) => text.is_empty(),
            AttemptPayload::File(bytes) => bytes.is_empty(),
        }
    }
}

/// Flat phase discriminant for view matching; the controller itself tracks
/// the correlation id and outcome alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    Idle,
    Selecting,
    Sending,
    AwaitingResolution,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeSeverity {
    Success,
    Danger,
}

impl OutcomeSeverity {
    pub fn css(self) -> &'static str {
        match self {
            OutcomeSeverity::Success => "success",
            OutcomeSeverity::Danger => "danger",
        }
    }
}

/// Terminal result of an attempt. `detail` carries the submission id when
/// the judge produced one, for linking to the submission page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub severity: OutcomeSeverity,
    pub message: String,
    pub detail: Option<SubmissionId>,
}

/// Read-only projection of the attempt for form binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptView {
    pub phase: AttemptPhase,
    pub selected: Option<String>,
    pub payload: AttemptPayload,
    pub outcome: Option<Outcome>,
    pub can_submit: bool,
}

enum Phase {
    Idle,
    Selecting,
    Sending,
    AwaitingResolution { correlation: SubmissionId },
    Resolved { outcome: Outcome },
}

struct AttemptState {
    phase: Phase,
    selected: Option<String>,
    payload: AttemptPayload,
    /// Bumped on every send; replies carrying an older serial are dropped.
    serial: u64,
}

impl AttemptState {
    fn view(&self) -> AttemptView {
        let phase = match self.phase {
            Phase::Idle => AttemptPhase::Idle,
            Phase::Selecting => AttemptPhase::Selecting,
            Phase::Sending => AttemptPhase::Sending,
            Phase::AwaitingResolution { .. } => AttemptPhase::AwaitingResolution,
            Phase::Resolved { .. } => AttemptPhase::Resolved,
        };
        let outcome = match &self.phase {
            Phase::Resolved { outcome } => Some(outcome.clone()),
            _ => None,
        };
        AttemptView {
            phase,
            selected: self.selected.clone(),
            payload: self.payload.clone(),
            outcome,
            can_submit: matches!(self.phase, Phase::Selecting) && !self.payload.is_empty(),
        }
    }
}

/// Drives one submission attempt at a time against the gateway.
pub struct SubmissionController {
    gateway: Arc<dyn ContestGateway>,
    state: Mutex<AttemptState>,
    events: broadcast::Sender<ClientEvent>,
}

impl SubmissionController {
    pub fn new(
        gateway: Arc<dyn ContestGateway>,
        events: broadcast::Sender<ClientEvent>,
    ) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            state: Mutex::new(AttemptState {
                phase: Phase::Idle,
                selected: None,
                payload: AttemptPayload::Empty,
                serial: 0,
            }),
            events,
        })
    }

    pub async fn snapshot(&self) -> AttemptView {
        self.state.lock().await.view()
    }

    /// Starts a new attempt for `slug`. Only valid while idle; an active
    /// attempt keeps its target until dismissed.
    pub async fn select(&self, slug: impl Into<String>) {
        let mut state = self.state.lock().await;
        if !matches!(state.phase, Phase::Idle) {
            debug!("language selection while an attempt is active ignored");
            return;
        }
        state.phase = Phase::Selecting;
        state.selected = Some(slug.into());
        state.payload = AttemptPayload::Empty;
        self.emit(&state);
    }

    pub async fn set_inline_code(&self, text: impl Into<String>) {
        let mut state = self.state.lock().await;
        if !matches!(state.phase, Phase::Selecting) {
            debug!("payload edit outside the selection phase ignored");
            return;
        }
        state.payload = AttemptPayload::Inline(text.into());
        self.emit(&state);
    }

    pub async fn set_uploaded_file(&self, bytes: Vec<u8>) {
        let mut state = self.state.lock().await;
        if !matches!(state.phase, Phase::Selecting) {
            debug!("payload edit outside the selection phase ignored");
            return;
        }
        state.payload = AttemptPayload::File(bytes);
        self.emit(&state);
    }

    /// Sends the staged attempt. A no-op unless the attempt is in
    /// `Selecting` with a non-empty payload, which keeps at most one
    /// submission in flight per client.
    pub async fn submit(&self) {
        let (request, serial) = {
            let mut state = self.state.lock().await;
            if !matches!(state.phase, Phase::Selecting) {
                debug!("submit outside the selection phase ignored");
                return;
            }
            let language = match state.selected.clone() {
                Some(slug) => slug,
                None => return,
            };
            let payload = match &state.payload {
                AttemptPayload::Inline(text) if !text.is_empty() => {
                    SubmitPayload::Code(text.clone())
                }
                AttemptPayload::File(bytes) if !bytes.is_empty() => {
                    SubmitPayload::File(bytes.clone())
                }
                _ => {
                    debug!("submit without content ignored");
                    return;
                }
            };
            state.phase = Phase::Sending;
            state.serial += 1;
            self.emit(&state);
            (SubmitRequest { language, payload }, state.serial)
        };

        let reply = self.gateway.submit_attempt(request).await;

        let mut state = self.state.lock().await;
        if state.serial != serial || !matches!(state.phase, Phase::Sending) {
            debug!("intake reply for a superseded attempt dropped");
            return;
        }
        match reply {
            Ok(SubmitReply::Accepted { id }) => {
                info!(submission = %id, "attempt accepted, awaiting the judge");
                state.phase = Phase::AwaitingResolution { correlation: id };
            }
            Ok(SubmitReply::Rejected { message }) => {
                warn!(message = %message, "attempt rejected by the intake");
                state.phase = Phase::Resolved {
                    outcome: Outcome {
                        severity: OutcomeSeverity::Danger,
                        message,
                        detail: None,
                    },
                };
            }
            Err(err) => {
                warn!(error = %err, "attempt could not be delivered");
                state.phase = Phase::Resolved {
                    outcome: Outcome {
                        severity: OutcomeSeverity::Danger,
                        message: err.to_string(),
                        detail: None,
                    },
                };
            }
        }
        self.emit(&state);
    }

    /// Handles a pushed submission-update notification. The push payload is
    /// only a wake-up signal: foreign and stale ids are ignored and the
    /// authoritative status is always pulled from the gateway.
    pub async fn reconcile(&self, pushed_id: &SubmissionId) {
        let serial = {
            let state = self.state.lock().await;
            match &state.phase {
                Phase::AwaitingResolution { correlation } if correlation == pushed_id => {
                    state.serial
                }
                _ => {
                    debug!(submission = %pushed_id, "ignoring notification for a foreign or stale submission");
                    return;
                }
            }
        };

        let record = match self.gateway.fetch_submission(pushed_id).await {
            Ok(record) => record,
            Err(err) => {
                warn!(submission = %pushed_id, error = %err, "submission pull failed, waiting for the next notification");
                let _ = self.events.send(ClientEvent::Error(err.to_string()));
                return;
            }
        };

        let mut state = self.state.lock().await;
        let still_current = state.serial == serial
            && matches!(&state.phase, Phase::AwaitingResolution { correlation } if correlation == pushed_id);
        if !still_current {
            debug!(submission = %pushed_id, "dropping pull result for an abandoned attempt");
            return;
        }

        let outcome = match record.status {
            SubmissionStatus::Pending => {
                debug!(submission = %pushed_id, "judge still running, staying subscribed");
                return;
            }
            SubmissionStatus::Failed => Outcome {
                severity: OutcomeSeverity::Danger,
                message: FAILED_MESSAGE.to_string(),
                detail: Some(record.id),
            },
            SubmissionStatus::Error => Outcome {
                severity: OutcomeSeverity::Danger,
                message: TIMED_OUT_MESSAGE.to_string(),
                detail: Some(record.id),
            },
            SubmissionStatus::Success => Outcome {
                severity: OutcomeSeverity::Success,
                message: WON_MESSAGE.to_string(),
                detail: Some(record.id),
            },
        };
        info!(submission = %pushed_id, severity = ?outcome.severity, "attempt resolved");
        state.phase = Phase::Resolved { outcome };
        self.emit(&state);
    }

    /// Abandons the attempt and returns to idle. Replies still in flight
    /// are dropped by the serial and phase checks when they land.
    pub async fn dismiss(&self) {
        let mut state = self.state.lock().await;
        if matches!(state.phase, Phase::Idle) {
            return;
        }
        state.phase = Phase::Idle;
        state.selected = None;
        state.payload = AttemptPayload::Empty;
        self.emit(&state);
    }

    fn emit(&self, state: &AttemptState) {
        let _ = self.events.send(ClientEvent::AttemptChanged(state.view()));
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
