//! Price models behind the [`Predictor`] seam.
//!
//! The pipeline only ever sees `dyn Predictor`; concrete formats live here:
//!
//! - `linear`: JSON linear-regression artifacts evaluated in-process
//! - `remote`: an HTTP inference endpoint
//! - `loader`: turns a configured [`ModelSource`] into a shared predictor

pub mod linear;
pub mod loader;
pub mod remote;

pub use linear::*;
pub use loader::*;
pub use remote::*;

use serde::Serialize;

use crate::domain::FeatureVector;

/// Error type returned by predictor implementations.
pub type EstimateError = Box<dyn std::error::Error + Send + Sync>;

/// A loaded model that maps a feature vector to a monetary value.
///
/// Implementations are read-only after load and may be shared across threads.
pub trait Predictor: Send + Sync {
    fn estimate(&self, vector: &FeatureVector) -> Result<f64, EstimateError>;

    /// What was loaded, for diagnostics.
    fn info(&self) -> ModelInfo;
}

/// Description of a loaded model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub kind: &'static str,
    pub name: String,
    /// Named parameters, if the model exposes them.
    pub parameters: Vec<(String, f64)>,
    pub endpoint: Option<String>,
}
