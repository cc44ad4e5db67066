//! Remote inference over HTTP.
//!
//! Request: `POST <url>` with `{"features": [7 numbers]}`.
//! Response: `{"prediction": number}`.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::FeatureVector;
use crate::error::PredictError;
use crate::models::{EstimateError, ModelInfo, Predictor};

#[derive(Debug, Serialize)]
struct EstimateRequest<'a> {
    features: &'a [f64],
}

#[derive(Debug, Deserialize)]
struct EstimateResponse {
    prediction: f64,
}

pub struct RemotePredictor {
    client: Client,
    url: Url,
}

impl RemotePredictor {
    /// Build a client for `url`; each request gives up after `timeout`.
    ///
    /// No request is sent here. Connection failures show up on the first
    /// `estimate`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, PredictError> {
        let url = Url::parse(url)
            .map_err(|e| PredictError::ModelUnavailable(format!("invalid model URL '{url}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PredictError::ModelUnavailable(format!(
                "model URL must be http(s), got '{}'",
                url.scheme()
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PredictError::ModelUnavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, url })
    }
}

impl Predictor for RemotePredictor {
    fn estimate(&self, vector: &FeatureVector) -> Result<f64, EstimateError> {
        debug!(url = %self.url, "requesting remote estimate");
        let response = self
            .client
            .post(self.url.clone())
            .json(&EstimateRequest {
                features: vector.as_slice(),
            })
            .send()?
            .error_for_status()?;
        let body: EstimateResponse = response.json()?;
        Ok(body.prediction)
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            kind: "remote",
            name: self.url.host_str().unwrap_or_default().to_string(),
            parameters: Vec::new(),
            endpoint: Some(self.url.to_string()),
        }
    }
}
