//! Inference entry point: alignment, model invocation and result extraction

use crate::error::{PredictError, Result};
use crate::feature_aligner::FeatureAligner;
use crate::models::classifier::ModelInput;
use crate::models::loader::Artifacts;
use crate::types::prediction::{Outcome, Prediction};
use crate::types::record::{EncodedRow, RawRecord};
use std::sync::Arc;
use tracing::debug;

/// Scores raw records against loaded artifacts
pub struct InferenceEngine {
    artifacts: Arc<Artifacts>,
}

impl InferenceEngine {
    pub fn new(artifacts: Arc<Artifacts>) -> Self {
        Self { artifacts }
    }

    /// Name of the underlying classifier
    pub fn model_name(&self) -> &str {
        self.artifacts.classifier.name()
    }

    /// Number of positional features fed to the model, when known
    pub fn feature_count(&self) -> Option<usize> {
        self.artifacts
            .schema
            .as_ref()
            .map(|s| s.len())
            .or_else(|| self.artifacts.classifier.expected_width())
    }

    /// Encoded row for the split layout, `None` for pipeline models
    pub fn encode(&self, record: &RawRecord) -> Option<EncodedRow> {
        self.artifacts
            .schema
            .as_ref()
            .map(|schema| FeatureAligner::new(schema).align(record))
    }

    /// Score one record
    pub fn predict(&self, record: &RawRecord) -> Result<Prediction> {
        let encoded = self.encode(record);
        let input = match &encoded {
            Some(row) => ModelInput::Encoded(row),
            None => ModelInput::Raw(record),
        };

        let classifier = &self.artifacts.classifier;
        if let (ModelInput::Encoded(row), Some(expected)) = (input, classifier.expected_width()) {
            if row.len() != expected {
                return Err(PredictError::shape_mismatch(
                    format!("{} columns", expected),
                    format!("{} columns", row.len()),
                ));
            }
        }

        let scores = classifier.predict_scores(input)?;
        let probability = scores.positive_probability()?;
        let outcome = Outcome::from_class_index(scores.class_index());

        debug!(
            model = %classifier.name(),
            width = input.width(),
            probability,
            outcome = ?outcome,
            "Inference complete"
        );

        Ok(Prediction::new(outcome, probability))
    }

    /// Score a batch of records independently
    pub fn predict_batch(&self, records: &[RawRecord]) -> Vec<Result<Prediction>> {
        records.iter().map(|r| self.predict(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classifier::{ClassScores, Classifier};
    use crate::schema::FeatureSchema;
    use crate::types::prediction::RiskLevel;

    /// Logistic model over an encoded row, or over `salary` for raw rows
    struct LogisticStub {
        weights: Vec<f64>,
        bias: f64,
        width: Option<usize>,
    }

    impl Classifier for LogisticStub {
        fn name(&self) -> &str {
            "logistic-stub"
        }

        fn expected_width(&self) -> Option<usize> {
            self.width
        }

        fn predict_scores(&self, input: ModelInput<'_>) -> Result<ClassScores> {
            let z = match input {
                ModelInput::Encoded(row) => row
                    .values()
                    .iter()
                    .zip(&self.weights)
                    .map(|(&x, w)| x as f64 * w)
                    .sum::<f64>(),
                ModelInput::Raw(record) => record
                    .get("salary")
                    .and_then(|v| v.as_number())
                    .map(|s| -s / 10_000.0)
                    .unwrap_or(0.0),
            } + self.bias;

            let p = 1.0 / (1.0 + (-z).exp());
            Ok(ClassScores {
                label: None,
                probabilities: vec![1.0 - p, p],
            })
        }
    }

    fn split_engine(width: Option<usize>) -> InferenceEngine {
        let schema = FeatureSchema::new([
            "city_development_index",
            "experience",
            "training_hours",
            "gender_Male",
            "company_type_Pvt Ltd",
        ])
        .unwrap();
        let stub = LogisticStub {
            weights: vec![-3.0, -0.1, 0.001, 0.2, 0.4],
            bias: 1.0,
            width,
        };
        InferenceEngine::new(Arc::new(Artifacts::split(Box::new(stub), schema)))
    }

    fn employee() -> RawRecord {
        RawRecord::new()
            .with("gender", "Male")
            .with("company_type", "Pvt Ltd")
            .with("city_development_index", 0.6)
            .with("experience", 5.0)
            .with("training_hours", 120.0)
            .with("lastnewjob", "1")
    }

    #[test]
    fn test_split_prediction() {
        let engine = split_engine(Some(5));
        let prediction = engine.predict(&employee()).unwrap();

        // z = -1.8 - 0.5 + 0.12 + 0.2 + 0.4 + 1.0 = -0.58
        let expected = 1.0 / (1.0 + 0.58_f64.exp());
        assert!((prediction.probability - expected).abs() < 1e-6);
        assert_eq!(prediction.outcome, Outcome::Stay);
        assert_eq!(prediction.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_probability_bounds() {
        let engine = split_engine(None);
        let records = [
            RawRecord::new(),
            employee(),
            employee().with("training_hours", 1.0e9),
            employee().with("experience", -1.0e9),
        ];

        for prediction in engine.predict_batch(&records) {
            let p = prediction.unwrap().probability;
            assert!((0.0..=1.0).contains(&p), "probability {} out of bounds", p);
        }
    }

    #[test]
    fn test_width_mismatch_is_reported() {
        let engine = split_engine(Some(7));

        match engine.predict(&employee()) {
            Err(PredictError::ShapeMismatch { expected, actual }) => {
                assert_eq!(expected, "7 columns");
                assert_eq!(actual, "5 columns");
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_pipeline_prediction_uses_raw_record() {
        let stub = LogisticStub {
            weights: Vec::new(),
            bias: 2.0,
            width: None,
        };
        let engine = InferenceEngine::new(Arc::new(Artifacts::pipeline(Box::new(stub))));
        let record = RawRecord::new()
            .with("experience", 5.0)
            .with("salary", 30000.0)
            .with("training_hours", 20.0)
            .with("work_life_balance", "Medium");

        assert!(engine.encode(&record).is_none());

        let prediction = engine.predict(&record).unwrap();
        // z = -3 + 2 = -1
        let expected = 1.0 / (1.0 + 1.0_f64.exp());
        assert!((prediction.probability - expected).abs() < 1e-9);
        assert_eq!(prediction.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_feature_count() {
        assert_eq!(split_engine(None).feature_count(), Some(5));
    }
}
