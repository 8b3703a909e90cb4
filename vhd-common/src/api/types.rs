//! Shared API request/response types
//!
//! Field names follow the backend's JSON (`model_loaded`, `class_id`), so the
//! same structs deserialize backend replies and serialize proxy replies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

// ========================================
// Health Types
// ========================================

/// Backend health state
///
/// Anything other than `"healthy"` on the wire is treated as unhealthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

impl From<String> for HealthState {
    fn from(value: String) -> Self {
        if value == "healthy" {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        }
    }
}

/// Response body of the backend `GET /health` endpoint
///
/// # Examples
///
/// ```
/// use vhd_common::api::types::HealthStatus;
///
/// let json = r#"{"status":"healthy","model_loaded":true,"service":"vhd","version":"1.0.0"}"#;
/// let health: HealthStatus = serde_json::from_str(json).unwrap();
/// assert!(health.is_available());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: HealthState,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub version: String,
}

impl HealthStatus {
    /// Available iff the backend reports healthy AND the model is loaded
    pub fn is_available(&self) -> bool {
        self.status == HealthState::Healthy && self.model_loaded
    }
}

// ========================================
// Prediction Types
// ========================================

/// Diagnostic class returned by the classification backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClassLabel {
    /// Aortic Stenosis
    As,
    /// Mitral Regurgitation
    Mr,
    /// Mitral Stenosis
    Ms,
    /// Mitral Valve Prolapse
    Mvp,
    /// Normal
    N,
}

impl ClassLabel {
    /// All labels in backend order (class_id 0..=4)
    pub const ALL: [ClassLabel; 5] = [
        ClassLabel::As,
        ClassLabel::Mr,
        ClassLabel::Ms,
        ClassLabel::Mvp,
        ClassLabel::N,
    ];

    /// Short code as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLabel::As => "AS",
            ClassLabel::Mr => "MR",
            ClassLabel::Ms => "MS",
            ClassLabel::Mvp => "MVP",
            ClassLabel::N => "N",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown class label: {}", s)))
    }
}

/// Per-class probabilities (expected to sum to ~1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    #[serde(rename = "AS")]
    pub aortic_stenosis: f64,
    #[serde(rename = "MR")]
    pub mitral_regurgitation: f64,
    #[serde(rename = "MS")]
    pub mitral_stenosis: f64,
    #[serde(rename = "MVP")]
    pub mitral_valve_prolapse: f64,
    #[serde(rename = "N")]
    pub normal: f64,
}

impl Probabilities {
    /// Probability for one label
    pub fn get(&self, label: ClassLabel) -> f64 {
        match label {
            ClassLabel::As => self.aortic_stenosis,
            ClassLabel::Mr => self.mitral_regurgitation,
            ClassLabel::Ms => self.mitral_stenosis,
            ClassLabel::Mvp => self.mitral_valve_prolapse,
            ClassLabel::N => self.normal,
        }
    }

    /// (label, probability) pairs in backend order
    pub fn iter(&self) -> impl Iterator<Item = (ClassLabel, f64)> + '_ {
        ClassLabel::ALL.into_iter().map(move |label| (label, self.get(label)))
    }

    /// Pairs sorted by descending probability (stable for ties)
    pub fn sorted_desc(&self) -> Vec<(ClassLabel, f64)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs
    }

    /// Sum of all probabilities
    pub fn total(&self) -> f64 {
        self.iter().map(|(_, p)| p).sum()
    }

    /// Label with the highest probability
    ///
    /// Informational only: `PredictionResult::prediction` is authoritative and
    /// may legitimately differ from this value.
    pub fn argmax(&self) -> ClassLabel {
        self.sorted_desc()
            .first()
            .map(|(label, _)| *label)
            .unwrap_or(ClassLabel::N)
    }
}

/// Response body of the backend `POST /predict` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub filename: String,
    pub prediction: ClassLabel,
    pub class_id: i64,
    pub confidence: f64,
    pub probabilities: Probabilities,
}

// ========================================
// Error Response Types
// ========================================

/// Error body returned by the proxy prediction route
///
/// # Examples
///
/// ```
/// use vhd_common::api::types::ErrorBody;
///
/// let body = ErrorBody::with_details("Backend error: 500", "model crashed");
/// let json = serde_json::to_value(&body).unwrap();
/// assert_eq!(json["details"], "model crashed");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Error body returned by the proxy health route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnhealthyBody {
    pub status: HealthState,
    pub error: String,
}

impl UnhealthyBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: HealthState::Unhealthy,
            error: error.into(),
        }
    }
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> PredictionResult {
        PredictionResult {
            filename: "New_N_020.wav".to_string(),
            prediction: ClassLabel::N,
            class_id: 4,
            confidence: 0.91,
            probabilities: Probabilities {
                aortic_stenosis: 0.02,
                mitral_regurgitation: 0.03,
                mitral_stenosis: 0.01,
                mitral_valve_prolapse: 0.03,
                normal: 0.91,
            },
        }
    }

    #[test]
    fn test_health_status_deserialization() {
        let json = r#"{"status":"healthy","model_loaded":true,"service":"VHD Audio Classification API","version":"1.0.0"}"#;
        let health: HealthStatus = serde_json::from_str(json).unwrap();

        assert_eq!(health.status, HealthState::Healthy);
        assert!(health.model_loaded);
        assert_eq!(health.service, "VHD Audio Classification API");
        assert!(health.is_available());
    }

    #[test]
    fn test_health_requires_model_loaded() {
        let json = r#"{"status":"healthy","model_loaded":false}"#;
        let health: HealthStatus = serde_json::from_str(json).unwrap();

        assert!(!health.is_available());
        assert_eq!(health.version, "");
    }

    #[test]
    fn test_unknown_health_state_is_unhealthy() {
        let json = r#"{"status":"degraded","model_loaded":true}"#;
        let health: HealthStatus = serde_json::from_str(json).unwrap();

        assert_eq!(health.status, HealthState::Unhealthy);
        assert!(!health.is_available());
    }

    #[test]
    fn test_health_state_serializes_lowercase() {
        let body = UnhealthyBody::new("Backend service unavailable");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["error"], "Backend service unavailable");
    }

    #[test]
    fn test_prediction_result_wire_format() {
        let json = r#"{
            "filename": "New_N_020.wav",
            "prediction": "N",
            "class_id": 4,
            "confidence": 0.91,
            "probabilities": {"AS": 0.02, "MR": 0.03, "MS": 0.01, "MVP": 0.03, "N": 0.91}
        }"#;
        let result: PredictionResult = serde_json::from_str(json).unwrap();

        assert_eq!(result, sample_result());
    }

    #[test]
    fn test_probabilities_sum_close_to_one() {
        let result = sample_result();
        assert!((result.probabilities.total() - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_sorted_desc_orders_by_probability() {
        let probs = Probabilities {
            aortic_stenosis: 0.10,
            mitral_regurgitation: 0.50,
            mitral_stenosis: 0.05,
            mitral_valve_prolapse: 0.30,
            normal: 0.05,
        };

        let sorted = probs.sorted_desc();
        assert_eq!(sorted[0].0, ClassLabel::Mr);
        assert_eq!(sorted[1].0, ClassLabel::Mvp);
        assert_eq!(sorted[2].0, ClassLabel::As);
        assert_eq!(probs.argmax(), ClassLabel::Mr);
    }

    #[test]
    fn test_class_label_parsing() {
        assert_eq!("mvp".parse::<ClassLabel>().unwrap(), ClassLabel::Mvp);
        assert_eq!("N".parse::<ClassLabel>().unwrap(), ClassLabel::N);
        assert!("XX".parse::<ClassLabel>().is_err());
    }

    #[test]
    fn test_unknown_prediction_label_rejected() {
        let json = r#"{"filename":"a.wav","prediction":"XYZ","class_id":9,"confidence":0.5,
            "probabilities":{"AS":0.2,"MR":0.2,"MS":0.2,"MVP":0.2,"N":0.2}}"#;
        assert!(serde_json::from_str::<PredictionResult>(json).is_err());
    }

    #[test]
    fn test_error_body_omits_missing_details() {
        let json = serde_json::to_string(&ErrorBody::new("Failed to connect to prediction service")).unwrap();
        assert!(!json.contains("details"));
    }
}
