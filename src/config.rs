//! Configuration management for the attrition predictor

use crate::form::InputForm;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// How the trained model is packaged on disk
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactLayout {
    /// One model that embeds preprocessing and consumes raw named fields
    #[default]
    Pipeline,
    /// A classifier plus a separate list of one-hot feature columns
    Split,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    #[serde(default = "InputForm::dashboard")]
    pub form: InputForm,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default)]
    pub layout: ArtifactLayout,
    /// Path to the ONNX model
    pub model_path: String,
    /// Path to the JSON feature-column list (split layout only)
    #[serde(default)]
    pub schema_path: Option<String>,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Accepted values of `logging.format`
pub const LOG_FORMATS: [&str; 2] = ["json", "pretty"];

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.artifacts.layout == ArtifactLayout::Split && self.artifacts.schema_path.is_none() {
            anyhow::bail!("artifacts.schema_path is required for the split layout");
        }
        if self.artifacts.layout == ArtifactLayout::Pipeline && self.artifacts.schema_path.is_some() {
            anyhow::bail!("artifacts.schema_path is only used by the split layout");
        }
        if self.artifacts.onnx_threads == 0 {
            anyhow::bail!("artifacts.onnx_threads must be at least 1");
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            anyhow::bail!(
                "logging.format must be one of {:?}, got '{}'",
                LOG_FORMATS,
                self.logging.format
            );
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactsConfig {
                layout: ArtifactLayout::Pipeline,
                model_path: "models/pipeline.onnx".to_string(),
                schema_path: None,
                onnx_threads: 1,
            },
            form: InputForm::dashboard(),
            logging: LoggingConfig::default(),
        }
    }
}
