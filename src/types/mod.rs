//! Type definitions for records and predictions

pub mod prediction;
pub mod record;

pub use prediction::{Outcome, Prediction, PredictionReport, RiskLevel};
pub use record::{EncodedRow, FieldValue, RawRecord};
