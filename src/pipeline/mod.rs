//! The prediction pipeline.
//!
//! One invocation runs start to finish on the calling thread:
//!
//! ```text
//! PropertyFeatures -> FeatureVector -> Predictor::estimate -> checks -> PredictionResult
//! ```
//!
//! There is no retry and no state carried between invocations. The predictor is
//! shared read-only, so one `PredictionPipeline` can serve many threads.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, warn};

use crate::domain::{PredictionResult, PriceTier, PropertyFeatures};
use crate::error::PredictError;
use crate::input::AREA_SQFT;
use crate::models::Predictor;

pub mod confidence;

pub use confidence::*;

pub struct PredictionPipeline {
    predictor: Arc<dyn Predictor>,
    confidence: Box<dyn ConfidenceSource>,
    latency: Option<Duration>,
}

impl PredictionPipeline {
    /// Pipeline with cosmetic confidence and no simulated latency.
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            predictor,
            confidence: Box::new(CosmeticConfidence::from_entropy()),
            latency: None,
        }
    }

    pub fn with_confidence(mut self, confidence: impl ConfidenceSource + 'static) -> Self {
        self.confidence = Box::new(confidence);
        self
    }

    /// Pause before each estimate. Purely UX pacing; `None` disables it.
    pub fn with_latency(mut self, latency: Option<Duration>) -> Self {
        self.latency = latency.filter(|d| !d.is_zero());
        self
    }

    pub fn predictor(&self) -> &Arc<dyn Predictor> {
        &self.predictor
    }

    /// Estimate `features` and derive the display metrics.
    ///
    /// # Panics
    /// Panics if `features.area_sqft()` is below the area domain, which cannot
    /// happen for features produced by the input collector.
    pub fn predict(&self, features: &PropertyFeatures) -> Result<PredictionResult, PredictError> {
        if let Some(latency) = self.latency {
            debug!(latency_ms = latency.as_millis() as u64, "simulated analysis delay");
            thread::sleep(latency);
        }

        let value = estimate_value(self.predictor.as_ref(), features)?;

        let area = features.area_sqft();
        assert!(area >= AREA_SQFT.min, "area_sqft {area} below domain minimum");

        let result = PredictionResult {
            value,
            price_per_area: value / area,
            confidence_percent: self.confidence.confidence_percent(),
            tier: PriceTier::classify(value),
            estimated_at: Local::now(),
        };
        debug!(value, tier = ?result.tier, "estimate complete");
        Ok(result)
    }

    /// Value across the area domain with every other field held fixed.
    ///
    /// Returns `steps` (at least 2) `(area, value)` points from the minimum to
    /// the maximum area.
    pub fn area_sweep(&self, features: &PropertyFeatures, steps: usize) -> Result<Vec<(f64, f64)>, PredictError> {
        let steps = steps.max(2);
        let mut out = Vec::with_capacity(steps);
        for i in 0..steps {
            let u = i as f64 / (steps as f64 - 1.0);
            let area = AREA_SQFT.min + u * (AREA_SQFT.max - AREA_SQFT.min);
            let value = estimate_value(self.predictor.as_ref(), &features.with_area(area))?;
            out.push((area, value));
        }
        Ok(out)
    }
}

/// One-shot prediction with a fresh cosmetic confidence source.
pub fn predict(features: &PropertyFeatures, model: Arc<dyn Predictor>) -> Result<PredictionResult, PredictError> {
    PredictionPipeline::new(model).predict(features)
}

/// Invoke the model and reject values that must not be shown as a price.
fn estimate_value(model: &dyn Predictor, features: &PropertyFeatures) -> Result<f64, PredictError> {
    let vector = features.feature_vector();

    let value = match panic::catch_unwind(AssertUnwindSafe(|| model.estimate(&vector))) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            warn!(error = %err, "model invocation failed");
            return Err(PredictError::ModelUnavailable(err.to_string()));
        }
        Err(_) => {
            warn!("model panicked during estimate");
            return Err(PredictError::ModelUnavailable("model panicked during estimate".to_string()));
        }
    };

    if !value.is_finite() || value < 0.0 {
        warn!(value, "model returned an invalid value");
        return Err(PredictError::InvalidPrediction(value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureVector;
    use crate::input::{InputCollector, PropertyInput};
    use crate::models::{EstimateError, ModelInfo};
    use std::sync::Mutex;

    /// Returns a fixed value and remembers the vectors it saw.
    struct Fixed {
        value: f64,
        seen: Mutex<Vec<FeatureVector>>,
    }

    impl Fixed {
        fn new(value: f64) -> Arc<Self> {
            Arc::new(Self {
                value,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl Predictor for Fixed {
        fn estimate(&self, vector: &FeatureVector) -> Result<f64, EstimateError> {
            self.seen.lock().unwrap().push(*vector);
            Ok(self.value)
        }

        fn info(&self) -> ModelInfo {
            ModelInfo {
                kind: "fixed",
                name: "fixed".to_string(),
                parameters: Vec::new(),
                endpoint: None,
            }
        }
    }

    struct Failing;

    impl Predictor for Failing {
        fn estimate(&self, _vector: &FeatureVector) -> Result<f64, EstimateError> {
            Err("artifact corrupted".into())
        }

        fn info(&self) -> ModelInfo {
            ModelInfo {
                kind: "failing",
                name: String::new(),
                parameters: Vec::new(),
                endpoint: None,
            }
        }
    }

    struct Panicking;

    impl Predictor for Panicking {
        fn estimate(&self, _vector: &FeatureVector) -> Result<f64, EstimateError> {
            panic!("boom")
        }

        fn info(&self) -> ModelInfo {
            ModelInfo {
                kind: "panicking",
                name: String::new(),
                parameters: Vec::new(),
                endpoint: None,
            }
        }
    }

    /// Area scales the value so the sweep is observable.
    struct PerSqft(f64);

    impl Predictor for PerSqft {
        fn estimate(&self, vector: &FeatureVector) -> Result<f64, EstimateError> {
            Ok(vector.as_slice()[0] * self.0)
        }

        fn info(&self) -> ModelInfo {
            ModelInfo {
                kind: "per_sqft",
                name: String::new(),
                parameters: Vec::new(),
                endpoint: None,
            }
        }
    }

    fn reference_features() -> PropertyFeatures {
        InputCollector::default()
            .collect(&PropertyInput {
                area_sqft: Some(1500.0),
                bedrooms: Some(3),
                bathrooms: Some(2),
                floors: Some(1),
                age_years: Some(5),
                has_garage: Some(false),
                location_score: Some(5),
                ..PropertyInput::default()
            })
            .unwrap()
    }

    #[test]
    fn end_to_end_reference_case() {
        let model = Fixed::new(4_500_000.0);
        let pipeline = PredictionPipeline::new(model.clone()).with_confidence(CosmeticConfidence::seeded(1));

        let result = pipeline.predict(&reference_features()).unwrap();
        assert_eq!(result.value, 4_500_000.0);
        assert!((result.price_per_area - 3000.0).abs() < 1e-9);
        assert_eq!(result.tier, PriceTier::MidRange);
        assert!((CONFIDENCE_MIN..=CONFIDENCE_MAX).contains(&result.confidence_percent));

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].values(), [1500.0, 3.0, 2.0, 1.0, 5.0, 0.0, 5.0]);
    }

    #[test]
    fn model_receives_same_vector_every_time() {
        let model = Fixed::new(1.0);
        let pipeline = PredictionPipeline::new(model.clone());
        let features = reference_features();
        for _ in 0..5 {
            pipeline.predict(&features).unwrap();
        }
        let seen = model.seen.lock().unwrap();
        assert!(seen.iter().all(|v| *v == seen[0]));
    }

    #[test]
    fn confidence_bounded_across_repeated_calls() {
        let pipeline = PredictionPipeline::new(Fixed::new(2_000_000.0));
        let features = reference_features();
        for _ in 0..500 {
            let c = pipeline.predict(&features).unwrap().confidence_percent;
            assert!((CONFIDENCE_MIN..=CONFIDENCE_MAX).contains(&c), "got {c}");
        }
    }

    #[test]
    fn tier_and_price_per_area_consistent_for_many_inputs() {
        let collector = InputCollector::default();
        for (area, value) in [(500.0, 0.0), (800.0, 2_999_999.99), (2500.0, 3_000_000.0), (10_000.0, 9.5e6)] {
            let features = collector
                .collect(&PropertyInput {
                    area_sqft: Some(area),
                    ..PropertyInput::default()
                })
                .unwrap();
            let result = predict(&features, Fixed::new(value)).unwrap();
            assert!(result.value >= 0.0);
            assert_eq!(result.tier, PriceTier::classify(value));
            assert!((result.price_per_area - value / area).abs() < 1e-9);
        }
    }

    #[test]
    fn failing_model_is_unavailable() {
        let err = predict(&reference_features(), Arc::new(Failing)).unwrap_err();
        assert_eq!(err, PredictError::ModelUnavailable("artifact corrupted".to_string()));
    }

    #[test]
    fn panicking_model_is_unavailable() {
        let err = predict(&reference_features(), Arc::new(Panicking)).unwrap_err();
        assert!(matches!(err, PredictError::ModelUnavailable(_)));
    }

    #[test]
    fn negative_and_nan_values_are_invalid() {
        let err = predict(&reference_features(), Fixed::new(-5.0)).unwrap_err();
        assert_eq!(err, PredictError::InvalidPrediction(-5.0));

        let err = predict(&reference_features(), Fixed::new(f64::NAN)).unwrap_err();
        assert!(matches!(err, PredictError::InvalidPrediction(v) if v.is_nan()));

        let err = predict(&reference_features(), Fixed::new(f64::INFINITY)).unwrap_err();
        assert!(matches!(err, PredictError::InvalidPrediction(_)));
    }

    #[test]
    fn latency_is_applied_when_configured() {
        let pipeline =
            PredictionPipeline::new(Fixed::new(1.0)).with_latency(Some(Duration::from_millis(30)));
        let start = std::time::Instant::now();
        pipeline.predict(&reference_features()).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn area_sweep_spans_domain() {
        let pipeline = PredictionPipeline::new(Arc::new(PerSqft(2.0)));
        let points = pipeline.area_sweep(&reference_features(), 20).unwrap();
        assert_eq!(points.len(), 20);
        assert_eq!(points[0], (500.0, 1000.0));
        assert_eq!(points[19], (10_000.0, 20_000.0));
        assert!(points.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn area_sweep_propagates_invalid_values() {
        let pipeline = PredictionPipeline::new(Fixed::new(-1.0));
        assert!(pipeline.area_sweep(&reference_features(), 5).is_err());
    }
}
