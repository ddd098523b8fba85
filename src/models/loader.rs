//! Artifact loading and the process-wide load-once handle

use crate::config::{ArtifactLayout, ArtifactsConfig};
use crate::error::{PredictError, Result};
use crate::models::classifier::Classifier;
use crate::models::onnx::OnnxModel;
use crate::schema::FeatureSchema;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::info;

/// Everything inference needs, loaded once and read-only afterwards
pub struct Artifacts {
    pub classifier: Box<dyn Classifier>,
    /// Present for the split layout only
    pub schema: Option<FeatureSchema>,
}

impl Artifacts {
    pub fn pipeline(classifier: Box<dyn Classifier>) -> Self {
        Self {
            classifier,
            schema: None,
        }
    }

    pub fn split(classifier: Box<dyn Classifier>, schema: FeatureSchema) -> Self {
        Self {
            classifier,
            schema: Some(schema),
        }
    }

    pub fn layout(&self) -> ArtifactLayout {
        if self.schema.is_some() {
            ArtifactLayout::Split
        } else {
            ArtifactLayout::Pipeline
        }
    }
}

/// Source of [`Artifacts`]
pub trait ArtifactLoader: Send + Sync {
    fn load(&self) -> Result<Artifacts>;
}

/// Loads an ONNX classifier and, for the split layout, its feature schema
pub struct ModelLoader {
    layout: ArtifactLayout,
    model_path: PathBuf,
    schema_path: Option<PathBuf>,
    onnx_threads: usize,
}

impl ModelLoader {
    pub fn new(config: &ArtifactsConfig) -> Self {
        Self {
            layout: config.layout,
            model_path: PathBuf::from(&config.model_path),
            schema_path: config.schema_path.as_ref().map(PathBuf::from),
            onnx_threads: config.onnx_threads,
        }
    }
}

impl ArtifactLoader for ModelLoader {
    fn load(&self) -> Result<Artifacts> {
        match self.layout {
            ArtifactLayout::Pipeline => {
                let model = OnnxModel::load(&self.model_path, "pipeline", self.onnx_threads)?;
                Ok(Artifacts::pipeline(Box::new(model)))
            }
            ArtifactLayout::Split => {
                // Schema first: it is cheap and a missing schema makes the model useless
                let schema_path = self.schema_path.as_ref().ok_or_else(|| {
                    PredictError::Configuration {
                        artifact: "schema_path".to_string(),
                        reason: "split layout requires a feature schema path".to_string(),
                    }
                })?;
                let schema = FeatureSchema::from_json_file(schema_path)?;
                let model = OnnxModel::load(&self.model_path, "classifier", self.onnx_threads)?;

                if let Some(width) = model.expected_width() {
                    if width != schema.len() {
                        return Err(PredictError::configuration(
                            &self.model_path,
                            format!(
                                "model expects {} features but schema {} lists {}",
                                width,
                                schema_path.display(),
                                schema.len()
                            ),
                        ));
                    }
                }

                Ok(Artifacts::split(Box::new(model), schema))
            }
        }
    }
}

/// Explicit load-once handle.
///
/// The first successful [`ArtifactCache::get_or_load`] runs the loader; all
/// later calls return the same `Arc` without touching the loader again. A
/// failed load leaves the cache empty.
pub struct ArtifactCache<L: ArtifactLoader> {
    loader: L,
    artifacts: OnceLock<Arc<Artifacts>>,
    init: Mutex<()>,
    loads: AtomicUsize,
}

impl<L: ArtifactLoader> ArtifactCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            artifacts: OnceLock::new(),
            init: Mutex::new(()),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn get_or_load(&self) -> Result<Arc<Artifacts>> {
        if let Some(artifacts) = self.artifacts.get() {
            return Ok(artifacts.clone());
        }

        let _guard = self
            .init
            .lock()
            .map_err(|e| PredictError::Configuration {
                artifact: "artifact cache".to_string(),
                reason: format!("an earlier load panicked: {}", e),
            })?;

        // Another caller may have finished loading while we waited
        if let Some(artifacts) = self.artifacts.get() {
            return Ok(artifacts.clone());
        }

        self.loads.fetch_add(1, Ordering::Relaxed);
        let artifacts = Arc::new(self.loader.load()?);
        let artifacts = self.artifacts.get_or_init(|| artifacts).clone();

        info!(layout = ?artifacts.layout(), "Artifacts loaded");
        Ok(artifacts)
    }

    /// Whether artifacts are already cached
    pub fn is_loaded(&self) -> bool {
        self.artifacts.get().is_some()
    }

    /// Number of times the loader has been invoked
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}
