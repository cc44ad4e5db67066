//! Shared domain types.
//!
//! These types flow from input collection through the prediction pipeline and
//! into the presentation layer:
//!
//! - `PropertyFeatures`: the validated attributes of one property
//! - `FeatureVector`: the fixed-order model input derived from them
//! - `PredictionResult` / `PriceTier`: what the presentation layer renders

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Number of values the model consumes.
pub const FEATURE_COUNT: usize = 7;

/// Feature names in model input order.
///
/// Trained models depend on this exact order; artifacts are checked against it
/// when they are loaded.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "area_sqft",
    "bedrooms",
    "bathrooms",
    "floors",
    "age_years",
    "has_garage",
    "location_score",
];

/// Upper bound (exclusive) of the budget tier.
pub const MID_RANGE_FLOOR: f64 = 3_000_000.0;
/// Lower bound (inclusive) of the premium tier.
pub const PREMIUM_FLOOR: f64 = 7_000_000.0;

/// How the input collector treats out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicy {
    /// Pull the value to the nearest bound.
    #[default]
    Clamp,
    /// Fail with a `ValidationError` naming the field and bound.
    Reject,
}

/// Validated property attributes.
///
/// Values of this type are only produced by [`crate::input::InputCollector`],
/// so every bounded field is inside its domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PropertyFeatures {
    area_sqft: f64,
    bedrooms: u32,
    bathrooms: u32,
    floors: u32,
    age_years: u32,
    has_garage: bool,
    location_score: u32,
    luxury_level: u32,
    demand_index: u32,
}

impl PropertyFeatures {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_validated(
        area_sqft: f64,
        bedrooms: u32,
        bathrooms: u32,
        floors: u32,
        age_years: u32,
        has_garage: bool,
        location_score: u32,
        luxury_level: u32,
        demand_index: u32,
    ) -> Self {
        Self {
            area_sqft,
            bedrooms,
            bathrooms,
            floors,
            age_years,
            has_garage,
            location_score,
            luxury_level,
            demand_index,
        }
    }

    pub fn area_sqft(&self) -> f64 {
        self.area_sqft
    }

    pub fn bedrooms(&self) -> u32 {
        self.bedrooms
    }

    pub fn bathrooms(&self) -> u32 {
        self.bathrooms
    }

    pub fn floors(&self) -> u32 {
        self.floors
    }

    pub fn age_years(&self) -> u32 {
        self.age_years
    }

    pub fn has_garage(&self) -> bool {
        self.has_garage
    }

    pub fn location_score(&self) -> u32 {
        self.location_score
    }

    /// Recorded with the request but not part of the model input.
    pub fn luxury_level(&self) -> u32 {
        self.luxury_level
    }

    /// Recorded with the request but not part of the model input.
    pub fn demand_index(&self) -> u32 {
        self.demand_index
    }

    /// Copy of these features with a different (already in-domain) area.
    pub(crate) fn with_area(mut self, area_sqft: f64) -> Self {
        self.area_sqft = area_sqft;
        self
    }

    /// Build the model input in the fixed order given by [`FEATURE_NAMES`].
    ///
    /// `luxury_level` and `demand_index` are not included; the
    /// shipped models are trained on the seven-feature layout.
    pub fn feature_vector(&self) -> FeatureVector {
        FeatureVector([
            self.area_sqft,
            f64::from(self.bedrooms),
            f64::from(self.bathrooms),
            f64::from(self.floors),
            f64::from(self.age_years),
            if self.has_garage { 1.0 } else { 0.0 },
            f64::from(self.location_score),
        ])
    }
}

/// Fixed-order model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        self.0
    }
}

/// Market segment of an estimated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Budget,
    MidRange,
    Premium,
}

/// Styling hint for the tier banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLevel {
    Info,
    Warning,
    Error,
}

impl PriceTier {
    /// Classify a (finite, non-negative) value.
    pub fn classify(value: f64) -> Self {
        if value < MID_RANGE_FLOOR {
            PriceTier::Budget
        } else if value < PREMIUM_FLOOR {
            PriceTier::MidRange
        } else {
            PriceTier::Premium
        }
    }

    /// Machine-readable name, as used in JSON and CSV output.
    pub fn slug(self) -> &'static str {
        match self {
            PriceTier::Budget => "budget",
            PriceTier::MidRange => "mid_range",
            PriceTier::Premium => "premium",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PriceTier::Budget => "Budget-Friendly Segment",
            PriceTier::MidRange => "Mid-Range Property",
            PriceTier::Premium => "Premium / Luxury Property",
        }
    }

    pub fn banner_level(self) -> BannerLevel {
        match self {
            PriceTier::Budget => BannerLevel::Info,
            PriceTier::MidRange => BannerLevel::Warning,
            PriceTier::Premium => BannerLevel::Error,
        }
    }
}

/// Display-ready output of one estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Estimated value in whole currency units.
    pub value: f64,
    pub price_per_area: f64,
    /// Presentation-only figure; not a statistical confidence of the model.
    pub confidence_percent: u8,
    pub tier: PriceTier,
    pub estimated_at: DateTime<Local>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(PriceTier::classify(0.0), PriceTier::Budget);
        assert_eq!(PriceTier::classify(2_999_999.99), PriceTier::Budget);
        assert_eq!(PriceTier::classify(3_000_000.0), PriceTier::MidRange);
        assert_eq!(PriceTier::classify(6_999_999.99), PriceTier::MidRange);
        assert_eq!(PriceTier::classify(7_000_000.0), PriceTier::Premium);
        assert_eq!(PriceTier::classify(1.0e12), PriceTier::Premium);
    }

    #[test]
    fn banner_levels_follow_tier() {
        assert_eq!(PriceTier::Budget.banner_level(), BannerLevel::Info);
        assert_eq!(PriceTier::MidRange.banner_level(), BannerLevel::Warning);
        assert_eq!(PriceTier::Premium.banner_level(), BannerLevel::Error);
    }

    #[test]
    fn feature_vector_order_ignores_recorded_only_fields() {
        let a = PropertyFeatures::from_validated(2200.0, 4, 3, 2, 12, true, 8, 1, 1);
        let b = PropertyFeatures::from_validated(2200.0, 4, 3, 2, 12, true, 8, 10, 10);

        let expected = [2200.0, 4.0, 3.0, 2.0, 12.0, 1.0, 8.0];
        assert_eq!(a.feature_vector().values(), expected);
        assert_eq!(b.feature_vector().values(), expected);
        assert_eq!(a.feature_vector(), a.feature_vector());
    }

    #[test]
    fn garage_encodes_as_zero_or_one() {
        let without = PropertyFeatures::from_validated(1500.0, 3, 2, 1, 5, false, 5, 5, 6);
        assert_eq!(without.feature_vector().as_slice()[5], 0.0);
        let with = PropertyFeatures::from_validated(1500.0, 3, 2, 1, 5, true, 5, 5, 6);
        assert_eq!(with.feature_vector().as_slice()[5], 1.0);
    }
}
