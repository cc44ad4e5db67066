//! Shared setup used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the start-up workflow:
//! args -> model source -> load (fail fast) -> pipeline
//!
//! The front-ends can then focus on presentation (printing vs widgets).

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::cli::{EstimateArgs, ModelArgs};
use crate::domain::{PredictionResult, PropertyFeatures};
use crate::error::{AppError, PredictError};
use crate::models::{ModelSource, load_predictor};
use crate::pipeline::{CosmeticConfidence, PredictionPipeline};

/// Resolve the model source; a URL takes precedence over a path.
pub fn model_source(args: &ModelArgs) -> ModelSource {
    match &args.model_url {
        Some(url) if !url.trim().is_empty() => ModelSource::Remote {
            url: url.trim().to_string(),
            timeout: Duration::from_millis(args.model_timeout_ms),
        },
        _ => ModelSource::File(args.model_path.clone()),
    }
}

/// Load the model and assemble a pipeline.
pub fn build_pipeline(
    model: &ModelArgs,
    estimate: &EstimateArgs,
    latency: Duration,
) -> Result<PredictionPipeline, AppError> {
    let predictor = load_predictor(&model_source(model))?;
    let confidence = match estimate.seed {
        Some(seed) => CosmeticConfidence::seeded(seed),
        None => CosmeticConfidence::from_entropy(),
    };
    Ok(PredictionPipeline::new(predictor)
        .with_confidence(confidence)
        .with_latency(Some(latency)))
}

/// Run one estimate on a worker thread and stop waiting after `timeout`.
///
/// A late estimate is discarded; the worker is not interrupted.
pub fn predict_with_timeout(
    pipeline: Arc<PredictionPipeline>,
    features: PropertyFeatures,
    timeout: Duration,
) -> Result<PredictionResult, PredictError> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(pipeline.predict(&features));
    });

    match rx.recv_timeout(timeout) {
        Ok(outcome) => outcome,
        Err(RecvTimeoutError::Timeout) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "estimate timed out");
            Err(PredictError::ModelUnavailable(format!(
                "no estimate within {} ms",
                timeout.as_millis()
            )))
        }
        Err(RecvTimeoutError::Disconnected) => Err(PredictError::ModelUnavailable(
            "estimate worker exited without a result".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputCollector, PropertyInput};
    use crate::models::LinearModel;
    use std::path::PathBuf;

    fn model_args() -> ModelArgs {
        ModelArgs {
            model_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("model/model.json"),
            model_url: None,
            model_timeout_ms: 500,
        }
    }

    fn sample_pipeline(latency: Duration) -> Arc<PredictionPipeline> {
        let model = LinearModel::load(&model_args().model_path).unwrap();
        Arc::new(PredictionPipeline::new(Arc::new(model)).with_latency(Some(latency)))
    }

    fn features() -> PropertyFeatures {
        InputCollector::default().collect(&PropertyInput::default()).unwrap()
    }

    #[test]
    fn url_takes_precedence_over_path() {
        let mut args = model_args();
        assert!(matches!(model_source(&args), ModelSource::File(_)));

        args.model_url = Some("http://localhost:9000/predict".to_string());
        assert_eq!(
            model_source(&args),
            ModelSource::Remote {
                url: "http://localhost:9000/predict".to_string(),
                timeout: Duration::from_millis(500),
            }
        );

        args.model_url = Some("   ".to_string());
        assert!(matches!(model_source(&args), ModelSource::File(_)));
    }

    #[test]
    fn build_pipeline_fails_fast_on_missing_model() {
        let mut args = model_args();
        args.model_path = PathBuf::from("missing/model.json");
        let estimate = EstimateArgs {
            policy: Default::default(),
            currency: "₹".to_string(),
            seed: Some(3),
        };
        let err = build_pipeline(&args, &estimate, Duration::ZERO).err().unwrap();
        assert_eq!(err.exit_code(), crate::error::EXIT_MODEL);
    }

    #[test]
    fn sample_model_estimates_default_property() {
        // 500k + 2500*1500 + 150k*3 + 100k*2 + 120k*1 - 20k*5 + 0 + 250k*5
        let result = sample_pipeline(Duration::ZERO).predict(&features()).unwrap();
        assert!((result.value - 6_170_000.0).abs() < 1e-6, "got {}", result.value);
        assert_eq!(result.tier, crate::domain::PriceTier::MidRange);
    }

    #[test]
    fn timeout_returns_model_unavailable() {
        let pipeline = sample_pipeline(Duration::from_millis(500));
        let err = predict_with_timeout(pipeline, features(), Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, PredictError::ModelUnavailable(ref m) if m.contains("20 ms")), "{err}");
    }

    #[test]
    fn fast_estimate_beats_timeout() {
        let pipeline = sample_pipeline(Duration::ZERO);
        let result = predict_with_timeout(pipeline, features(), Duration::from_secs(5)).unwrap();
        assert!(result.value > 0.0);
    }
}
