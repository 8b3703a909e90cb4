//! API module for shared HTTP API functionality
//!
//! Wire types exchanged with the classification backend and re-served by
//! vhd-proxy. Consumed by:
//! - vhd-proxy (pass-through routes, error bodies)
//! - vhd-demo (health prober, prediction client, workflow controller)
//!
//! # Design Principle
//!
//! This module contains ONLY serde types and pure helpers; no HTTP framework
//! dependencies. Each crate wraps them with its own client or router code.

pub mod types;

pub use types::{
    ClassLabel, ErrorBody, HealthState, HealthStatus, PredictionResult, Probabilities,
    UnhealthyBody,
};
