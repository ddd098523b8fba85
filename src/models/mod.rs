//! Model artifacts and inference

pub mod classifier;
pub mod inference;
pub mod loader;
pub mod onnx;

pub use classifier::{ClassScores, Classifier, ModelInput};
pub use inference::InferenceEngine;
pub use loader::{ArtifactCache, ArtifactLoader, Artifacts, ModelLoader};
pub use onnx::OnnxModel;
