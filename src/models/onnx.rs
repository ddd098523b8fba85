//! ONNX Runtime backed classifier

use crate::error::{PredictError, Result};
use crate::models::classifier::{ClassScores, Classifier, ModelInput};
use crate::types::record::{FieldValue, RawRecord};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::tensor::TensorElementType;
use ort::value::{
    DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor, ValueType,
};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Declared model input
#[derive(Debug, Clone)]
struct InputSpec {
    name: String,
    element: Option<TensorElementType>,
    /// Fixed second dimension, if declared
    width: Option<usize>,
}

/// Loaded ONNX model with its input/output metadata
pub struct OnnxModel {
    name: String,
    /// `Session::run` needs exclusive access
    session: Mutex<Session>,
    inputs: Vec<InputSpec>,
    probability_output: String,
    label_output: Option<String>,
}

impl OnnxModel {
    /// Load a model from file
    pub fn load<P: AsRef<Path>>(path: P, name: &str, onnx_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(PredictError::configuration(path, "model file not found"));
        }

        info!(model = %name, path = %path.display(), threads = onnx_threads, "Loading ONNX model");

        let session = Session::builder()
            .map_err(|e| PredictError::configuration(path, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| PredictError::configuration(path, e))?
            .with_intra_threads(onnx_threads)
            .map_err(|e| PredictError::configuration(path, e))?
            .commit_from_file(path)
            .map_err(|e| PredictError::configuration(path, e))?;

        let inputs: Vec<InputSpec> = session
            .inputs
            .iter()
            .map(|input| match &input.input_type {
                ValueType::Tensor { ty, shape, .. } => InputSpec {
                    name: input.name.clone(),
                    element: Some(*ty),
                    width: shape.get(1).and_then(|&d| usize::try_from(d).ok()),
                },
                _ => InputSpec {
                    name: input.name.clone(),
                    element: None,
                    width: None,
                },
            })
            .collect();

        if inputs.is_empty() {
            return Err(PredictError::configuration(path, "model declares no inputs"));
        }

        let probability_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .ok_or_else(|| PredictError::configuration(path, "model declares no outputs"))?;

        let label_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .map(|o| o.name.clone());

        info!(
            model = %name,
            inputs = ?inputs.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            probability_output = %probability_output,
            label_output = ?label_output,
            "Model loaded successfully"
        );

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
            inputs,
            probability_output,
            label_output,
        })
    }

    /// Names of the declared model inputs
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|i| i.name.as_str()).collect()
    }

    /// One `[1, 1]` tensor per declared input, taken from the record by name
    fn raw_inputs(&self, record: &RawRecord) -> Result<Vec<(String, DynValue)>> {
        self.inputs
            .iter()
            .map(|spec| {
                let value = record.get(&spec.name).ok_or_else(|| {
                    PredictError::shape_mismatch(
                        format!("model input '{}'", spec.name),
                        "no such field in record",
                    )
                })?;
                Ok((spec.name.clone(), field_tensor(spec, value)?))
            })
            .collect()
    }

    fn extract_scores(&self, outputs: &SessionOutputs) -> Result<ClassScores> {
        let label = match &self.label_output {
            Some(name) => outputs
                .get(name.as_str())
                .and_then(|o| o.try_extract_tensor::<i64>().ok())
                .and_then(|(_, data)| data.first().copied()),
            None => None,
        };

        let probabilities = self.extract_probabilities(outputs)?;

        debug!(model = %self.name, label = ?label, probabilities = ?probabilities, "Model output extracted");

        Ok(ClassScores {
            label,
            probabilities,
        })
    }

    /// Class probabilities for the single row.
    /// Handles tensor outputs as well as seq(map(int64, float)) outputs.
    fn extract_probabilities(&self, outputs: &SessionOutputs) -> Result<Vec<f64>> {
        if let Some(output) = outputs.get(self.probability_output.as_str()) {
            if let Some(probabilities) = probabilities_from_value(output)? {
                return Ok(probabilities);
            }
        }

        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }
            if let Some(probabilities) = probabilities_from_value(&output)? {
                debug!(model = %self.name, output = %name, "Extracted probabilities (fallback)");
                return Ok(probabilities);
            }
        }

        Err(PredictError::inference(format!(
            "model '{}' produced no probability output",
            self.name
        )))
    }
}

impl Classifier for OnnxModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn expected_width(&self) -> Option<usize> {
        self.inputs.first().and_then(|i| i.width)
    }

    fn predict_scores(&self, input: ModelInput<'_>) -> Result<ClassScores> {
        let mut session = self
            .session
            .lock()
            .map_err(|e| PredictError::inference(format!("Lock error: {}", e)))?;

        let outputs = match input {
            ModelInput::Encoded(row) => {
                let input_name = self.inputs[0].name.as_str();
                let shape = vec![1_i64, row.len() as i64];
                let tensor = Tensor::from_array((shape, row.values().to_vec()))
                    .map_err(PredictError::inference)?;
                session.run(ort::inputs![input_name => tensor])
            }
            ModelInput::Raw(record) => {
                let values = self.raw_inputs(record)?;
                session.run(values)
            }
        }
        .map_err(PredictError::inference)?;

        self.extract_scores(&outputs)
    }
}

fn field_tensor(spec: &InputSpec, value: &FieldValue) -> Result<DynValue> {
    let shape = vec![1_i64, 1];

    let number = || {
        value.as_number().ok_or_else(|| {
            PredictError::shape_mismatch(
                format!("numeric value for model input '{}'", spec.name),
                format!("category '{}'", value),
            )
        })
    };

    let tensor = match spec.element {
        Some(TensorElementType::String) => {
            Tensor::from_string_array((shape, &[value.to_string()][..])).map(|t| t.into_dyn())
        }
        Some(TensorElementType::Float64) => {
            Tensor::from_array((shape, vec![number()?])).map(|t| t.into_dyn())
        }
        Some(TensorElementType::Int64) => {
            Tensor::from_array((shape, vec![number()?.round() as i64])).map(|t| t.into_dyn())
        }
        Some(TensorElementType::Int32) => {
            Tensor::from_array((shape, vec![number()?.round() as i32])).map(|t| t.into_dyn())
        }
        _ => Tensor::from_array((shape, vec![number()? as f32])).map(|t| t.into_dyn()),
    };

    tensor.map_err(PredictError::inference)
}

/// `Ok(None)` when the value is neither a float tensor nor a seq(map)
fn probabilities_from_value(output: &DynValue) -> Result<Option<Vec<f64>>> {
    if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
        let dims: Vec<i64> = shape.iter().copied().collect();
        return Ok(Some(first_row(&dims, data)));
    }

    let dtype = output.dtype();
    if DynSequenceValueType::can_downcast(&dtype) {
        return probabilities_from_sequence_map(output).map(Some);
    }

    Ok(None)
}

/// First row of a `[batch, classes]` or `[classes]` tensor
fn first_row(dims: &[i64], data: &[f32]) -> Vec<f64> {
    let classes = match dims {
        [_, classes] => (*classes).max(0) as usize,
        _ => data.len(),
    };

    data.iter().take(classes).map(|&p| p as f64).collect()
}

fn probabilities_from_sequence_map(output: &DynValue) -> Result<Vec<f64>> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| PredictError::inference(format!("Failed to downcast to sequence: {}", e)))?;

    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .map_err(PredictError::inference)?;

    let map_value = maps
        .first()
        .ok_or_else(|| PredictError::inference("Empty sequence"))?;

    let pairs = map_value
        .try_extract_key_values::<i64, f32>()
        .map_err(PredictError::inference)?;

    Ok(probabilities_from_pairs(pairs))
}

/// Dense probability vector from (class id, probability) pairs, indexed by
/// class id. Classes missing from the map get 0, negative ids are ignored.
fn probabilities_from_pairs(mut pairs: Vec<(i64, f32)>) -> Vec<f64> {
    pairs.sort_by_key(|(class_id, _)| *class_id);

    let classes = pairs.last().map(|(id, _)| (*id).max(0) as usize + 1).unwrap_or(0);
    let mut probabilities = vec![0.0; classes];
    for (class_id, prob) in pairs {
        if class_id >= 0 {
            probabilities[class_id as usize] = prob as f64;
        }
    }

    probabilities
}
