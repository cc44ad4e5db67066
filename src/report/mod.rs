//! Reporting utilities: formatted terminal output and machine-readable records.
//!
//! We keep formatting code in one place so the pipeline returns plain data and
//! output changes stay localized.

pub mod format;

pub use format::*;

use serde::Serialize;

use crate::domain::{PredictionResult, PropertyFeatures};

/// One estimate as emitted by `hp predict --json`.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport<'a> {
    pub features: &'a PropertyFeatures,
    #[serde(flatten)]
    pub result: &'a PredictionResult,
    pub formatted_value: String,
    pub formatted_price_per_area: String,
    pub tier_label: &'static str,
}

impl<'a> PredictionReport<'a> {
    pub fn new(features: &'a PropertyFeatures, result: &'a PredictionResult, currency: &str) -> Self {
        Self {
            features,
            result,
            formatted_value: format_currency(result.value, currency),
            formatted_price_per_area: format_currency(result.price_per_area, currency),
            tier_label: result.tier.display_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceTier;
    use crate::input::{InputCollector, PropertyInput};
    use chrono::Local;

    #[test]
    fn json_report_flattens_result() {
        let features = InputCollector::default().collect(&PropertyInput::default()).unwrap();
        let result = PredictionResult {
            value: 7_000_000.0,
            price_per_area: 7_000_000.0 / 1500.0,
            confidence_percent: 88,
            tier: PriceTier::Premium,
            estimated_at: Local::now(),
        };
        let json = serde_json::to_value(PredictionReport::new(&features, &result, "$")).unwrap();
        assert_eq!(json["value"], 7_000_000.0);
        assert_eq!(json["tier"], "premium");
        assert_eq!(json["confidence_percent"], 88);
        assert_eq!(json["formatted_value"], "$ 7,000,000.00");
        assert_eq!(json["features"]["bedrooms"], 3);
        assert_eq!(json["features"]["luxury_level"], 5);
    }
}
