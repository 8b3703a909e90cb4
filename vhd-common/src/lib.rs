//! # VHD Common Library
//!
//! Shared code for the VHD heart-sound demo crates:
//! - API request/response types (health, prediction, error bodies)
//! - Class label and example-file catalogs
//! - Configuration loading and backend address resolution

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;

pub use api::types::{ClassLabel, HealthState, HealthStatus, PredictionResult, Probabilities};
pub use error::{Error, Result};
