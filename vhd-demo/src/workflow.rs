//! Upload/prediction workflow state machine
//!
//! CHECKING_SERVICE → READY → IDLE → ANALYZING → RESULT, with UNAVAILABLE
//! reachable from CHECKING_SERVICE and an inline error carried by IDLE.
//!
//! ```text
//! CheckingService ──probe ok──▶ Ready ──▶ Idle ◀──reset── Result
//!        │  ▲                             │  ▲              ▲
//!   probe│  │retry                  submit│  │failure       │success
//!   fails▼  │                             ▼  │              │
//!     Unavailable                       Analyzing ──────────┘
//! ```
//!
//! The controller owns the single live [`WorkflowState`]. Its lock is never
//! held across an await: the phase is switched to `Analyzing` (or
//! `CheckingService`) before suspending, so actions arriving meanwhile see
//! that phase and are ignored.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;
use vhd_common::api::PredictionResult;

use crate::config::DemoConfig;
use crate::file_intake::{CandidateSource, FileIntake, IntakeError, UploadCandidate};
use crate::health_prober::HealthProber;
use crate::prediction_client::PredictionClient;

/// Workflow phase, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowPhase {
    /// Health probe in flight
    CheckingService,
    /// Probe succeeded; passes straight through to Idle
    Ready,
    /// Probe failed; only `retry` is accepted
    Unavailable,
    /// Accepting files and submit
    Idle,
    /// Prediction request in flight
    Analyzing,
    /// Holding a prediction result
    Result,
}

impl WorkflowPhase {
    /// Phases in which a new candidate may be accepted
    pub fn accepts_intake(&self) -> bool {
        matches!(self, WorkflowPhase::Idle | WorkflowPhase::Result)
    }
}

/// The single live workflow state
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    CheckingService,
    Unavailable {
        reason: String,
    },
    Idle {
        candidate: Option<UploadCandidate>,
        error: Option<String>,
    },
    Analyzing {
        candidate: UploadCandidate,
    },
    Result {
        candidate: UploadCandidate,
        result: PredictionResult,
    },
}

impl WorkflowState {
    fn empty_idle() -> Self {
        WorkflowState::Idle {
            candidate: None,
            error: None,
        }
    }

    pub fn phase(&self) -> WorkflowPhase {
        match self {
            WorkflowState::CheckingService => WorkflowPhase::CheckingService,
            WorkflowState::Unavailable { .. } => WorkflowPhase::Unavailable,
            WorkflowState::Idle { .. } => WorkflowPhase::Idle,
            WorkflowState::Analyzing { .. } => WorkflowPhase::Analyzing,
            WorkflowState::Result { .. } => WorkflowPhase::Result,
        }
    }

    /// Current candidate, if any
    pub fn candidate(&self) -> Option<&UploadCandidate> {
        match self {
            WorkflowState::Idle { candidate, .. } => candidate.as_ref(),
            WorkflowState::Analyzing { candidate } | WorkflowState::Result { candidate, .. } => {
                Some(candidate)
            }
            WorkflowState::CheckingService | WorkflowState::Unavailable { .. } => None,
        }
    }

    /// Prediction result, only present in `Result`
    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            WorkflowState::Result { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Inline error message, only present in `Idle`
    pub fn error(&self) -> Option<&str> {
        match self {
            WorkflowState::Idle { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// Submit is enabled only in `Idle` with a candidate
    pub fn can_submit(&self) -> bool {
        matches!(
            self,
            WorkflowState::Idle {
                candidate: Some(_),
                ..
            }
        )
    }
}

/// Phase change record
#[derive(Debug, Clone, Serialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_phase: WorkflowPhase,
    pub new_phase: WorkflowPhase,
    pub transitioned_at: DateTime<Utc>,
}

/// Whether an action changed the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    /// Not valid in the current phase; nothing happened
    Ignored,
}

struct Inner {
    state: WorkflowState,
    probe_in_flight: bool,
    transitions: Vec<StateTransition>,
}

impl Inner {
    fn transition_to(&mut self, session_id: Uuid, new_state: WorkflowState) {
        let old_phase = self.state.phase();
        let new_phase = new_state.phase();
        self.state = new_state;

        if old_phase != new_phase {
            info!(%session_id, from = ?old_phase, to = ?new_phase, "Workflow transition");
            self.transitions.push(StateTransition {
                session_id,
                old_phase,
                new_phase,
                transitioned_at: Utc::now(),
            });
        }
    }

    /// Record the transient Ready phase between CheckingService and Idle
    fn pass_through_ready(&mut self, session_id: Uuid) {
        let now = Utc::now();
        info!(%session_id, "Service ready");
        self.transitions.push(StateTransition {
            session_id,
            old_phase: self.state.phase(),
            new_phase: WorkflowPhase::Ready,
            transitioned_at: now,
        });
        self.transitions.push(StateTransition {
            session_id,
            old_phase: WorkflowPhase::Ready,
            new_phase: WorkflowPhase::Idle,
            transitioned_at: now,
        });
        self.state = WorkflowState::empty_idle();
    }
}

/// Orchestrates probe, intake, and prediction for one session
pub struct WorkflowController {
    session_id: Uuid,
    prober: HealthProber,
    intake: FileIntake,
    predictor: PredictionClient,
    inner: Mutex<Inner>,
}

impl WorkflowController {
    /// Build all components from one configuration, sharing one HTTP client
    pub fn new(config: &DemoConfig) -> reqwest::Result<Self> {
        let http_client = config.http_client()?;
        Ok(Self::from_parts(
            HealthProber::new(http_client.clone(), &config.api_base_url),
            FileIntake::new(http_client.clone(), &config.site_base_url),
            PredictionClient::new(http_client, &config.api_base_url),
        ))
    }

    /// Assemble from individually constructed components
    pub fn from_parts(
        prober: HealthProber,
        intake: FileIntake,
        predictor: PredictionClient,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            prober,
            intake,
            predictor,
            inner: Mutex::new(Inner {
                state: WorkflowState::CheckingService,
                probe_in_flight: false,
                transitions: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Inner holds plain data; a panic elsewhere cannot leave it half-updated
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Snapshot of the current state
    pub fn state(&self) -> WorkflowState {
        self.lock().state.clone()
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.lock().state.phase()
    }

    /// All phase changes so far, oldest first
    pub fn transitions(&self) -> Vec<StateTransition> {
        self.lock().transitions.clone()
    }

    /// Run the initial health probe
    ///
    /// Valid once, from the initial `CheckingService` state.
    pub async fn start(&self) -> ActionOutcome {
        {
            let mut inner = self.lock();
            if inner.state.phase() != WorkflowPhase::CheckingService || inner.probe_in_flight {
                debug!(session_id = %self.session_id, "start ignored");
                return ActionOutcome::Ignored;
            }
            inner.probe_in_flight = true;
        }
        self.run_probe().await
    }

    /// Re-probe after the service was found unavailable
    pub async fn retry(&self) -> ActionOutcome {
        {
            let mut inner = self.lock();
            if inner.state.phase() != WorkflowPhase::Unavailable {
                debug!(session_id = %self.session_id, phase = ?inner.state.phase(), "retry ignored");
                return ActionOutcome::Ignored;
            }
            inner.transition_to(self.session_id, WorkflowState::CheckingService);
            inner.probe_in_flight = true;
        }
        self.run_probe().await
    }

    async fn run_probe(&self) -> ActionOutcome {
        let outcome = self.prober.probe().await;

        let mut inner = self.lock();
        inner.probe_in_flight = false;
        match outcome {
            Ok(health) => {
                info!(
                    session_id = %self.session_id,
                    service = %health.service,
                    version = %health.version,
                    "Classification service available"
                );
                inner.pass_through_ready(self.session_id);
            }
            Err(e) => {
                warn!(session_id = %self.session_id, "{}", e);
                inner.transition_to(
                    self.session_id,
                    WorkflowState::Unavailable {
                        reason: e.to_string(),
                    },
                );
            }
        }
        ActionOutcome::Applied
    }

    /// Accept a new candidate
    ///
    /// On success the workflow is `Idle` with the new candidate and no error
    /// (a stale result is discarded). On failure the candidate and result are
    /// left untouched; in `Idle` the user-facing message is stored as the error.
    /// An empty drop changes nothing at all.
    pub async fn accept(&self, source: CandidateSource) -> Result<ActionOutcome, IntakeError> {
        if !self.phase().accepts_intake() {
            debug!(session_id = %self.session_id, "intake ignored");
            return Ok(ActionOutcome::Ignored);
        }

        let resolved = self.intake.accept(source).await;

        let mut inner = self.lock();
        // The phase may have moved on while an example was being fetched
        if !inner.state.phase().accepts_intake() {
            return Ok(ActionOutcome::Ignored);
        }

        match resolved {
            Ok(candidate) => {
                info!(
                    session_id = %self.session_id,
                    name = %candidate.original_name(),
                    mime_type = %candidate.mime_type(),
                    "Candidate accepted"
                );
                inner.transition_to(
                    self.session_id,
                    WorkflowState::Idle {
                        candidate: Some(candidate),
                        error: None,
                    },
                );
                Ok(ActionOutcome::Applied)
            }
            Err(IntakeError::EmptyDrop) => {
                debug!(session_id = %self.session_id, "Drop carried nothing usable");
                Err(IntakeError::EmptyDrop)
            }
            Err(e) => {
                warn!(session_id = %self.session_id, "Candidate rejected: {}", e);
                if let WorkflowState::Idle { error, .. } = &mut inner.state {
                    *error = Some(e.user_message());
                }
                Err(e)
            }
        }
    }

    /// Submit the current candidate for classification
    ///
    /// Only valid in `Idle` with a candidate. Issues exactly one prediction
    /// request; submits arriving while it is outstanding are ignored.
    pub async fn submit(&self) -> ActionOutcome {
        let candidate = {
            let mut inner = self.lock();
            let candidate = match &inner.state {
                WorkflowState::Idle {
                    candidate: Some(candidate),
                    ..
                } => candidate.clone(),
                _ => {
                    debug!(session_id = %self.session_id, "submit ignored");
                    return ActionOutcome::Ignored;
                }
            };
            inner.transition_to(
                self.session_id,
                WorkflowState::Analyzing {
                    candidate: candidate.clone(),
                },
            );
            candidate
        };

        let outcome = self.predictor.predict(&candidate).await;

        let mut inner = self.lock();
        match outcome {
            Ok(result) => {
                inner.transition_to(self.session_id, WorkflowState::Result { candidate, result });
            }
            Err(e) => {
                warn!(session_id = %self.session_id, "Prediction failed: {}", e);
                inner.transition_to(
                    self.session_id,
                    WorkflowState::Idle {
                        candidate: Some(candidate),
                        error: Some(e.user_message()),
                    },
                );
            }
        }
        ActionOutcome::Applied
    }

    /// Clear candidate, result, and error
    ///
    /// Valid from `Result` and `Idle`; repeated calls leave the same empty `Idle`.
    pub fn reset(&self) -> ActionOutcome {
        let mut inner = self.lock();
        if !inner.state.phase().accepts_intake() {
            debug!(session_id = %self.session_id, "reset ignored");
            return ActionOutcome::Ignored;
        }
        inner.transition_to(self.session_id, WorkflowState::empty_idle());
        ActionOutcome::Applied
    }
}
