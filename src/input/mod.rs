//! Input collection and validation.
//!
//! Raw input (`PropertyInput`) comes from CLI flags, CSV rows, or the terminal
//! form, with every field optional. [`InputCollector`] fills in defaults and
//! enforces each field's closed range, either by clamping or by rejecting,
//! depending on its [`InputPolicy`]. It is the only way to obtain a
//! [`PropertyFeatures`].

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::domain::{InputPolicy, PropertyFeatures};
use crate::error::{Bound, ValidationError};

/// Domain and default of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Increment used by interactive front-ends.
    pub step: f64,
}

pub const AREA_SQFT: FieldSpec = FieldSpec {
    name: "area_sqft",
    label: "Area (sqft)",
    min: 500.0,
    max: 10_000.0,
    default: 1500.0,
    step: 50.0,
};

pub const BEDROOMS: FieldSpec = field("bedrooms", "Bedrooms", 1.0, 10.0, 3.0);
pub const BATHROOMS: FieldSpec = field("bathrooms", "Bathrooms", 1.0, 10.0, 2.0);
pub const FLOORS: FieldSpec = field("floors", "Floors", 1.0, 5.0, 1.0);
pub const AGE_YEARS: FieldSpec = field("age_years", "Age (Years)", 0.0, 100.0, 5.0);
pub const LOCATION_SCORE: FieldSpec = field("location_score", "Location Score", 1.0, 10.0, 5.0);
pub const LUXURY_LEVEL: FieldSpec = field("luxury_level", "Luxury Level", 1.0, 10.0, 5.0);
pub const DEMAND_INDEX: FieldSpec = field("demand_index", "Market Demand Index", 1.0, 10.0, 6.0);

const fn field(name: &'static str, label: &'static str, min: f64, max: f64, default: f64) -> FieldSpec {
    FieldSpec {
        name,
        label,
        min,
        max,
        default,
        step: 1.0,
    }
}

/// Default for the only categorical field.
pub const DEFAULT_HAS_GARAGE: bool = false;

/// Unvalidated property attributes. Missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PropertyInput {
    #[serde(default)]
    pub area_sqft: Option<f64>,
    #[serde(default)]
    pub bedrooms: Option<i64>,
    #[serde(default)]
    pub bathrooms: Option<i64>,
    #[serde(default)]
    pub floors: Option<i64>,
    #[serde(default)]
    pub age_years: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_garage")]
    pub has_garage: Option<bool>,
    #[serde(default)]
    pub location_score: Option<i64>,
    #[serde(default)]
    pub luxury_level: Option<i64>,
    #[serde(default)]
    pub demand_index: Option<i64>,
}

impl PropertyInput {
    /// Input with every field explicitly set to its default.
    pub fn defaults() -> Self {
        Self {
            area_sqft: Some(AREA_SQFT.default),
            bedrooms: Some(BEDROOMS.default as i64),
            bathrooms: Some(BATHROOMS.default as i64),
            floors: Some(FLOORS.default as i64),
            age_years: Some(AGE_YEARS.default as i64),
            has_garage: Some(DEFAULT_HAS_GARAGE),
            location_score: Some(LOCATION_SCORE.default as i64),
            luxury_level: Some(LUXURY_LEVEL.default as i64),
            demand_index: Some(DEMAND_INDEX.default as i64),
        }
    }
}

/// Parse a textual garage answer (`yes`/`no`, `true`/`false`, `1`/`0`).
pub fn parse_garage(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Ok(true),
        "no" | "n" | "false" | "0" => Ok(false),
        other => Err(format!("expected yes/no, got '{other}'")),
    }
}

fn deserialize_garage<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_garage(s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Turns raw input into validated [`PropertyFeatures`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InputCollector {
    policy: InputPolicy,
}

impl InputCollector {
    pub fn new(policy: InputPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> InputPolicy {
        self.policy
    }

    /// Validate `raw`, applying defaults and the collector's range policy.
    ///
    /// Non-finite areas are rejected under either policy.
    pub fn collect(&self, raw: &PropertyInput) -> Result<PropertyFeatures, ValidationError> {
        let area_sqft = self.bounded(&AREA_SQFT, raw.area_sqft.unwrap_or(AREA_SQFT.default))?;

        Ok(PropertyFeatures::from_validated(
            area_sqft,
            self.bounded_int(&BEDROOMS, raw.bedrooms)?,
            self.bounded_int(&BATHROOMS, raw.bathrooms)?,
            self.bounded_int(&FLOORS, raw.floors)?,
            self.bounded_int(&AGE_YEARS, raw.age_years)?,
            raw.has_garage.unwrap_or(DEFAULT_HAS_GARAGE),
            self.bounded_int(&LOCATION_SCORE, raw.location_score)?,
            self.bounded_int(&LUXURY_LEVEL, raw.luxury_level)?,
            self.bounded_int(&DEMAND_INDEX, raw.demand_index)?,
        ))
    }

    fn bounded_int(&self, spec: &FieldSpec, value: Option<i64>) -> Result<u32, ValidationError> {
        let value = value.map(|v| v as f64).unwrap_or(spec.default);
        // Bounds are small non-negative integers, so the cast is exact.
        Ok(self.bounded(spec, value)? as u32)
    }

    fn bounded(&self, spec: &FieldSpec, value: f64) -> Result<f64, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError {
                field: spec.name,
                bound: Bound::Finite,
                value,
            });
        }

        let (target, bound) = if value < spec.min {
            (spec.min, Bound::Min(spec.min))
        } else if value > spec.max {
            (spec.max, Bound::Max(spec.max))
        } else {
            return Ok(value);
        };

        match self.policy {
            InputPolicy::Clamp => {
                debug!(field = spec.name, value, clamped = target, "clamped out-of-range input");
                Ok(target)
            }
            InputPolicy::Reject => Err(ValidationError {
                field: spec.name,
                bound,
                value,
            }),
        }
    }
}
