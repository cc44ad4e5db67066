//! Linear regression model loaded from a JSON artifact.
//!
//! Artifact schema (`format = "linear-v1"`):
//!
//! ```json
//! {
//!   "format": "linear-v1",
//!   "name": "baseline",
//!   "intercept": 500000.0,
//!   "features": ["area_sqft", "bedrooms", "bathrooms", "floors",
//!                "age_years", "has_garage", "location_score"],
//!   "coefficients": [2500.0, 150000.0, 100000.0, 120000.0, -20000.0, 200000.0, 250000.0]
//! }
//! ```
//!
//! `features` must list [`FEATURE_NAMES`] in order; a model trained on a
//! different layout is refused at load time rather than silently mis-fed.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use nalgebra::SVector;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
use crate::error::PredictError;
use crate::models::{EstimateError, ModelInfo, Predictor};

pub const LINEAR_FORMAT: &str = "linear-v1";

/// On-disk representation of a linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub format: String,
    #[serde(default)]
    pub name: String,
    pub intercept: f64,
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
}

/// `value = intercept + coefficients · x`
#[derive(Debug, Clone)]
pub struct LinearModel {
    name: String,
    intercept: f64,
    coefficients: SVector<f64, FEATURE_COUNT>,
}

impl LinearModel {
    /// Load and validate an artifact from disk.
    pub fn load(path: &Path) -> Result<Self, PredictError> {
        let file = File::open(path).map_err(|e| {
            PredictError::ModelUnavailable(format!("failed to open model '{}': {e}", path.display()))
        })?;
        let model = Self::from_reader(BufReader::new(file))?;
        info!(path = %path.display(), name = %model.name, "loaded linear model");
        Ok(model)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PredictError> {
        let artifact: LinearArtifact = serde_json::from_reader(reader)
            .map_err(|e| PredictError::ModelUnavailable(format!("malformed model artifact: {e}")))?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: LinearArtifact) -> Result<Self, PredictError> {
        let unavailable = |msg: String| PredictError::ModelUnavailable(msg);

        if artifact.format != LINEAR_FORMAT {
            return Err(unavailable(format!(
                "unsupported model format '{}' (expected '{LINEAR_FORMAT}')",
                artifact.format
            )));
        }
        if artifact.coefficients.len() != FEATURE_COUNT {
            return Err(unavailable(format!(
                "model has {} coefficients, expected {FEATURE_COUNT}",
                artifact.coefficients.len()
            )));
        }
        let names_match = artifact.features.len() == FEATURE_COUNT
            && artifact.features.iter().zip(FEATURE_NAMES).all(|(a, b)| a == b);
        if !names_match {
            return Err(unavailable(format!(
                "model feature order [{}] does not match [{}]",
                artifact.features.join(", "),
                FEATURE_NAMES.join(", ")
            )));
        }
        if !artifact.intercept.is_finite() || artifact.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(unavailable("model parameters must be finite".to_string()));
        }

        Ok(Self {
            name: artifact.name,
            intercept: artifact.intercept,
            coefficients: SVector::from_column_slice(&artifact.coefficients),
        })
    }
}

impl Predictor for LinearModel {
    fn estimate(&self, vector: &FeatureVector) -> Result<f64, EstimateError> {
        let x = SVector::<f64, FEATURE_COUNT>::from(vector.values());
        Ok(self.intercept + self.coefficients.dot(&x))
    }

    fn info(&self) -> ModelInfo {
        let mut parameters = vec![("intercept".to_string(), self.intercept)];
        parameters.extend(
            FEATURE_NAMES
                .iter()
                .zip(self.coefficients.iter())
                .map(|(name, c)| (name.to_string(), *c)),
        );
        ModelInfo {
            kind: "linear",
            name: self.name.clone(),
            parameters,
            endpoint: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputCollector, PropertyInput};

    fn artifact() -> LinearArtifact {
        LinearArtifact {
            format: LINEAR_FORMAT.to_string(),
            name: "test".to_string(),
            intercept: 1000.0,
            features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            coefficients: vec![10.0, 1.0, 2.0, 3.0, -1.0, 500.0, 100.0],
        }
    }

    #[test]
    fn estimate_is_intercept_plus_dot_product() {
        let model = LinearModel::from_artifact(artifact()).unwrap();
        let features = InputCollector::default()
            .collect(&PropertyInput {
                has_garage: Some(true),
                ..PropertyInput::default()
            })
            .unwrap();
        // 1000 + 10*1500 + 1*3 + 2*2 + 3*1 - 1*5 + 500*1 + 100*5
        let y = model.estimate(&features.feature_vector()).unwrap();
        assert!((y - 17_005.0).abs() < 1e-9, "got {y}");
    }

    #[test]
    fn parses_json_artifact() {
        let json = r#"{
            "format": "linear-v1",
            "intercept": 0.0,
            "features": ["area_sqft","bedrooms","bathrooms","floors","age_years","has_garage","location_score"],
            "coefficients": [1,0,0,0,0,0,0]
        }"#;
        let model = LinearModel::from_reader(json.as_bytes()).unwrap();
        assert_eq!(model.info().kind, "linear");
        assert_eq!(model.info().parameters.len(), FEATURE_COUNT + 1);
    }

    #[test]
    fn rejects_wrong_coefficient_count() {
        let mut a = artifact();
        a.coefficients.push(1.0);
        assert!(matches!(
            LinearModel::from_artifact(a),
            Err(PredictError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn rejects_reordered_features() {
        let mut a = artifact();
        a.features.swap(0, 1);
        let err = LinearModel::from_artifact(a).unwrap_err();
        assert!(err.to_string().contains("feature order"), "{err}");
    }

    #[test]
    fn rejects_unknown_format_and_non_finite_parameters() {
        let mut a = artifact();
        a.format = "pickle".to_string();
        assert!(LinearModel::from_artifact(a).is_err());

        let mut a = artifact();
        a.intercept = f64::NAN;
        assert!(LinearModel::from_artifact(a).is_err());
    }

    #[test]
    fn malformed_json_is_model_unavailable() {
        let err = LinearModel::from_reader("not json".as_bytes()).unwrap_err();
        assert!(matches!(err, PredictError::ModelUnavailable(_)));
    }

    #[test]
    fn missing_file_is_model_unavailable() {
        let err = LinearModel::load(Path::new("definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, PredictError::ModelUnavailable(_)));
    }
}
