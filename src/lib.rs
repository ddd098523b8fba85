//! Employee Attrition Predictor Library
//!
//! Aligns employee records to a training-time feature schema, scores them
//! with a pre-trained ONNX classifier and buckets the probability of leaving
//! into a risk level.

pub mod config;
pub mod error;
pub mod feature_aligner;
pub mod form;
pub mod metrics;
pub mod models;
pub mod schema;
pub mod types;

pub use config::AppConfig;
pub use error::PredictError;
pub use feature_aligner::FeatureAligner;
pub use form::InputForm;
pub use models::inference::InferenceEngine;
pub use models::loader::{ArtifactCache, ModelLoader};
pub use schema::FeatureSchema;
pub use types::{prediction::Prediction, record::RawRecord};
