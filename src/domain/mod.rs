//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - validated property attributes (`PropertyFeatures`) and the input policy
//! - the fixed-order model input (`FeatureVector`, `FEATURE_NAMES`)
//! - estimate outputs (`PredictionResult`, `PriceTier`)

pub mod types;

pub use types::*;
