//! Prediction results and the report handed to the presentation layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound of the medium-risk bucket
pub const MEDIUM_RISK_FLOOR: f64 = 0.30;
/// Lower bound of the high-risk bucket
pub const HIGH_RISK_FLOOR: f64 = 0.60;

/// Qualitative attrition risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket a probability of leaving. Each bucket includes its lower bound.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_FLOOR {
            RiskLevel::High
        } else if probability >= MEDIUM_RISK_FLOOR {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low risk",
            RiskLevel::Medium => "Medium risk",
            RiskLevel::High => "High risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Binary class predicted by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Class 0
    Stay,
    /// Class 1
    Leave,
}

impl Outcome {
    pub fn from_class_index(index: i64) -> Self {
        if index == 1 {
            Outcome::Leave
        } else {
            Outcome::Stay
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Outcome::Stay => "Employee Will Stay",
            Outcome::Leave => "Employee Will Leave",
        }
    }
}

/// Result of scoring one record
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub outcome: Outcome,
    /// Probability of the positive ("will leave") class, in [0, 1]
    pub probability: f64,
    pub risk_level: RiskLevel,
}

impl Prediction {
    pub fn new(outcome: Outcome, probability: f64) -> Self {
        Self {
            outcome,
            probability,
            risk_level: RiskLevel::from_probability(probability),
        }
    }

    /// Probability as a percentage with two decimals, e.g. `73.46%`
    pub fn probability_text(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

/// Output record written for every scored employee
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub report_id: String,
    pub timestamp: DateTime<Utc>,
    /// Caller-supplied reference (line number, employee id, ...)
    pub reference: String,
    pub outcome: Outcome,
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub headline: String,
    pub probability_text: String,
    pub risk_text: String,
}

impl PredictionReport {
    pub fn new(reference: impl Into<String>, prediction: &Prediction) -> Self {
        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            reference: reference.into(),
            outcome: prediction.outcome,
            probability: prediction.probability,
            risk_level: prediction.risk_level,
            headline: prediction.outcome.headline().to_string(),
            probability_text: prediction.probability_text(),
            risk_text: prediction.risk_level.label().to_string(),
        }
    }
}
