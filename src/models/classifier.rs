//! Classifier abstraction shared by the ONNX backend and tests

use crate::error::{PredictError, Result};
use crate::types::record::{EncodedRow, RawRecord};

/// Index of the "will leave" class in a two-class probability vector
pub const POSITIVE_CLASS: usize = 1;

/// Row handed to a classifier
#[derive(Debug, Clone, Copy)]
pub enum ModelInput<'a> {
    /// Positional row aligned to the feature schema (split layout)
    Encoded(&'a EncodedRow),
    /// Raw named fields for a model that embeds its own preprocessing
    Raw(&'a RawRecord),
}

impl ModelInput<'_> {
    pub fn width(&self) -> usize {
        match self {
            ModelInput::Encoded(row) => row.len(),
            ModelInput::Raw(record) => record.len(),
        }
    }
}

/// Raw classifier output for one row
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScores {
    /// Predicted class index when the model reports one
    pub label: Option<i64>,
    /// Per-class probabilities in the model's class order
    pub probabilities: Vec<f64>,
}

impl ClassScores {
    /// Probability of the positive class, checked to lie in [0, 1]
    pub fn positive_probability(&self) -> Result<f64> {
        if self.probabilities.len() < 2 {
            return Err(PredictError::shape_mismatch(
                "2 class probabilities",
                format!("{} class probabilities", self.probabilities.len()),
            ));
        }

        let probability = self.probabilities[POSITIVE_CLASS];
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(PredictError::inference(format!(
                "probability {} outside [0, 1]",
                probability
            )));
        }

        Ok(probability)
    }

    /// Class index, falling back to the most probable class
    pub fn class_index(&self) -> i64 {
        self.label.unwrap_or_else(|| {
            self.probabilities
                .iter()
                .enumerate()
                .fold((0, f64::MIN), |best, (i, &p)| if p > best.1 { (i, p) } else { best })
                .0 as i64
        })
    }
}

/// A trained binary classifier.
///
/// Implementations must be side-effect free from the caller's point of view.
pub trait Classifier: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Number of positional features the model expects, when it declares one
    fn expected_width(&self) -> Option<usize> {
        None
    }

    /// Score a single row
    fn predict_scores(&self, input: ModelInput<'_>) -> Result<ClassScores>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_probability_uses_second_class() {
        let scores = ClassScores {
            label: None,
            probabilities: vec![0.27, 0.73],
        };
        assert_eq!(scores.positive_probability().unwrap(), 0.73);
        assert_eq!(scores.class_index(), 1);
    }

    #[test]
    fn test_label_output_wins_over_argmax() {
        let scores = ClassScores {
            label: Some(0),
            probabilities: vec![0.45, 0.55],
        };
        assert_eq!(scores.class_index(), 0);
    }

    #[test]
    fn test_single_class_output_is_shape_mismatch() {
        let scores = ClassScores {
            label: None,
            probabilities: vec![0.9],
        };
        assert!(matches!(
            scores.positive_probability(),
            Err(PredictError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        let scores = ClassScores {
            label: None,
            probabilities: vec![-0.2, 1.2],
        };
        assert!(matches!(
            scores.positive_probability(),
            Err(PredictError::Inference(_))
        ));
    }
}
