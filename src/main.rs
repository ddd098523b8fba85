//! Attrition Predictor - Main Entry Point
//!
//! Reads employee records (one JSON object per line) from a file or stdin,
//! scores each against the configured model and writes one JSON report per
//! record to stdout.
//!
//! Usage: attrition-predictor [INPUT|-] [CONFIG]

use anyhow::{Context, Result};
use attrition_predictor::{
    config::AppConfig,
    error::PredictError,
    metrics::ScoringMetrics,
    models::{ArtifactCache, InferenceEngine, ModelLoader},
    types::{PredictionReport, RawRecord},
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config/config.toml";

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "-".to_string());
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    // Load configuration
    let config = AppConfig::load_from_path(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    init_logging(&config)?;
    info!(config = %config_path, "Configuration loaded successfully");

    // Artifacts are loaded once, up front, so a missing file aborts startup
    let cache = ArtifactCache::new(ModelLoader::new(&config.artifacts));
    let artifacts = cache.get_or_load().context("Failed to load model artifacts")?;
    let engine = InferenceEngine::new(artifacts);
    info!(
        model = %engine.model_name(),
        layout = ?config.artifacts.layout,
        features = ?engine.feature_count(),
        "Inference engine initialized"
    );

    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&input).with_context(|| format!("Failed to open {}", input))?;
        Box::new(BufReader::new(file))
    };

    let metrics = ScoringMetrics::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: RawRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                metrics.record_validation_failure();
                warn!(line = line_no, error = %e, "Failed to parse record");
                continue;
            }
        };

        if let Err(e) = config.form.validate(&record) {
            metrics.record_validation_failure();
            warn!(line = line_no, error = %e, "Record rejected");
            continue;
        }

        let start_time = Instant::now();
        match engine.predict(&record) {
            Ok(prediction) => {
                let elapsed = start_time.elapsed();
                metrics.record_prediction(elapsed, prediction.probability, prediction.risk_level);

                let report = PredictionReport::new(format!("line {}", line_no), &prediction);
                serde_json::to_writer(&mut out, &report)?;
                writeln!(out)?;

                debug!(
                    line = line_no,
                    probability = prediction.probability,
                    risk_level = ?prediction.risk_level,
                    scoring_time_us = elapsed.as_micros(),
                    "Record scored"
                );
            }
            Err(e @ PredictError::ShapeMismatch { .. }) => {
                metrics.record_inference_failure();
                error!(line = line_no, error = %e, "Record does not match the model input");
            }
            Err(e) => {
                metrics.record_inference_failure();
                error!(line = line_no, error = %e, "Inference failed");
            }
        }
    }

    out.flush()?;
    metrics.print_summary();

    Ok(())
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("warn")
            .add_directive(format!("attrition_predictor={}", config.logging.level).parse()?),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}
