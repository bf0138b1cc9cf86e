use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{
    domain::{CandidateFile, ErrorKind, SubmissionResult, WorkflowState},
    error::RejectionReason,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub mod error;
pub mod intake;
pub mod retry;
pub mod transport;

pub use error::ClientError;
pub use intake::{AcceptedFile, IntakeDecision, IntakePolicy};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use transport::{
    classify, AttemptOutcome, HttpSummaryTransport, SummaryTransport, TransportFailure,
    UploadPayload,
};

/// Workflow state plus the generation token of the submission that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSnapshot {
    pub generation: u64,
    pub state: WorkflowState,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowSnapshot {
    fn idle() -> Self {
        Self {
            generation: 0,
            state: WorkflowState::Idle,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty selection; the workflow was not touched.
    NoSelection,
    /// The intake filter refused the selection; no request was made.
    Rejected(RejectionReason),
    /// A submission was already pending; this one was dropped.
    Ignored,
    /// `reset` ran while this submission was in flight; its result was discarded.
    Superseded,
    Completed { state: WorkflowState, attempts: u32 },
}

/// Owns the workflow state and runs submissions against a summary transport.
///
/// Only one submission is active at a time. Every submission is tagged with a
/// generation number; `reset` bumps the generation, which cancels the
/// in-flight attempt loop and keeps any late result from being written.
pub struct SubmissionOrchestrator {
    transport: Arc<dyn SummaryTransport>,
    sleeper: Arc<dyn Sleeper>,
    intake: IntakePolicy,
    retry: RetryPolicy,
    state: watch::Sender<WorkflowSnapshot>,
}

impl SubmissionOrchestrator {
    pub fn new(transport: Arc<dyn SummaryTransport>) -> Self {
        Self::new_with_dependencies(
            transport,
            Arc::new(TokioSleeper),
            IntakePolicy::default(),
            RetryPolicy::default(),
        )
    }

    pub fn new_with_dependencies(
        transport: Arc<dyn SummaryTransport>,
        sleeper: Arc<dyn Sleeper>,
        intake: IntakePolicy,
        retry: RetryPolicy,
    ) -> Self {
        let (state, _) = watch::channel(WorkflowSnapshot::idle());
        Self {
            transport,
            sleeper,
            intake,
            retry,
            state,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    pub fn intake_policy(&self) -> &IntakePolicy {
        &self.intake
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.state.borrow().clone()
    }

    pub fn state(&self) -> WorkflowState {
        self.state.borrow().state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.state.subscribe()
    }

    /// Entry point for a raw user selection: filters it, then submits the
    /// accepted file.
    pub async fn submit_selection(&self, selection: Vec<CandidateFile>) -> SubmitOutcome {
        match self.intake.validate(selection) {
            IntakeDecision::Empty => SubmitOutcome::NoSelection,
            IntakeDecision::Rejected(reason) => {
                info!(reasons = ?reason.messages(), "selection rejected");
                SubmitOutcome::Rejected(reason)
            }
            IntakeDecision::Accepted(file) => self.submit(file).await,
        }
    }

    /// Runs one logical submission to a terminal state. Calling this while a
    /// submission is pending changes nothing and returns `Ignored`.
    pub async fn submit(&self, file: AcceptedFile) -> SubmitOutcome {
        let Some(generation) = self.begin() else {
            info!(file = %file.name(), "submission ignored, another one is pending");
            return SubmitOutcome::Ignored;
        };
        info!(
            generation,
            file = %file.name(),
            size = file.size_bytes(),
            media_type = %file.media_type(),
            "submission started"
        );

        let guard = PendingGuard {
            state: &self.state,
            generation,
        };
        let mut watcher = self.state.subscribe();
        let outcome = tokio::select! {
            biased;
            _ = wait_superseded(&mut watcher, generation) => {
                info!(generation, "submission superseded by reset");
                SubmitOutcome::Superseded
            }
            (result, attempts) = self.run_attempts(&file) => {
                let state = WorkflowState::from(result);
                if self.commit(generation, state.clone()) {
                    info!(
                        generation,
                        attempts,
                        failure = ?state.failure().map(|(kind, _)| kind),
                        "submission finished"
                    );
                    SubmitOutcome::Completed { state, attempts }
                } else {
                    debug!(generation, "discarding result of superseded submission");
                    SubmitOutcome::Superseded
                }
            }
        };
        guard.disarm();
        outcome
    }

    /// Returns to `Idle` from any state, abandoning a pending submission.
    pub fn reset(&self) {
        self.state.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.state = WorkflowState::Idle;
            snapshot.updated_at = Utc::now();
        });
        info!(generation = self.state.borrow().generation, "workflow reset");
    }

    fn begin(&self) -> Option<u64> {
        let mut generation = None;
        self.state.send_if_modified(|snapshot| {
            if snapshot.state.is_pending() {
                return false;
            }
            snapshot.generation += 1;
            snapshot.state = WorkflowState::Pending;
            snapshot.updated_at = Utc::now();
            generation = Some(snapshot.generation);
            true
        });
        generation
    }

    /// Writes a terminal state only if `generation` is still current.
    fn commit(&self, generation: u64, state: WorkflowState) -> bool {
        self.state.send_if_modified(|snapshot| {
            if snapshot.generation != generation || !snapshot.state.is_pending() {
                return false;
            }
            snapshot.state = state;
            snapshot.updated_at = Utc::now();
            true
        })
    }

    async fn run_attempts(&self, file: &AcceptedFile) -> (SubmissionResult, u32) {
        let payload = match file.read_bytes().await {
            Ok(bytes) => UploadPayload {
                file_name: file.name().to_string(),
                media_type: file.media_type().to_string(),
                bytes,
            },
            Err(err) => {
                warn!(file = %file.name(), "failed to read accepted file: {err}");
                return (
                    SubmissionResult::failure(
                        ErrorKind::LocalFileFailure,
                        format!("Failed to read {}: {err}", file.name()),
                    ),
                    0,
                );
            }
        };

        let mut attempts = 0;
        loop {
            attempts += 1;
            let outcome = self.transport.send(&payload).await;
            let result = classify(self.transport.endpoint(), outcome);

            let SubmissionResult::Failure { kind, message } = &result else {
                return (result, attempts);
            };
            let retry = self.retry.should_retry(*kind, attempts);
            warn!(
                attempt = attempts,
                max_attempts = self.retry.max_attempts(),
                %kind,
                retry,
                "summary attempt failed: {message}"
            );
            if !retry {
                return (result, attempts);
            }

            self.sleeper.sleep(self.retry.delay).await;
        }
    }
}

/// Rolls a still-current `Pending` back to `Idle` if the submission future is
/// dropped before it reaches a terminal state.
struct PendingGuard<'a> {
    state: &'a watch::Sender<WorkflowSnapshot>,
    generation: u64,
}

impl PendingGuard<'_> {
    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let generation = self.generation;
        let rolled_back = self.state.send_if_modified(|snapshot| {
            if snapshot.generation != generation || !snapshot.state.is_pending() {
                return false;
            }
            snapshot.state = WorkflowState::Idle;
            snapshot.updated_at = Utc::now();
            true
        });
        if rolled_back {
            warn!(generation, "submission dropped while pending, workflow back to idle");
        }
    }
}

async fn wait_superseded(watcher: &mut watch::Receiver<WorkflowSnapshot>, generation: u64) {
    let changed = watcher
        .wait_for(|snapshot| snapshot.generation != generation)
        .await
        .is_ok();
    if !changed {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
