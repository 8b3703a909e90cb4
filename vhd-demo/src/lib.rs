//! vhd-demo library
//!
//! The upload/prediction workflow of the VHD demo page:
//! health check → file intake → submission → result.
//!
//! Components (leaves first):
//! - [`health_prober::HealthProber`]: backend availability
//! - [`file_intake::FileIntake`]: candidate acquisition and MIME validation
//! - [`prediction_client::PredictionClient`]: multipart submission
//! - [`workflow::WorkflowController`]: the state machine tying them together

pub mod config;
pub mod file_intake;
pub mod health_prober;
pub mod prediction_client;
pub mod report;
pub mod workflow;

pub use config::DemoConfig;
pub use file_intake::{CandidateSource, DropPayload, FileIntake, IntakeError, LocalFile, UploadCandidate};
pub use health_prober::{HealthProber, ProbeError};
pub use prediction_client::{PredictError, PredictionClient};
pub use workflow::{ActionOutcome, StateTransition, WorkflowController, WorkflowPhase, WorkflowState};
