//! Error types.
//!
//! Library code reports failures through two `thiserror` enums:
//!
//! - [`ValidationError`]: a field fell outside its declared domain (input collection)
//! - [`PredictError`]: the model could not produce a usable estimate (pipeline)
//!
//! The binary converts both into [`AppError`], which carries the process exit code.

use thiserror::Error;

/// Exit code for usage, input, and file errors.
pub const EXIT_INPUT: u8 = 2;
/// Exit code when the model cannot be loaded or invoked.
pub const EXIT_MODEL: u8 = 3;
/// Exit code for invalid predictions and other runtime failures.
pub const EXIT_RUNTIME: u8 = 4;

/// A property attribute that violates its declared domain.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} = {value} is outside its allowed range ({bound})")]
pub struct ValidationError {
    pub field: &'static str,
    pub bound: Bound,
    pub value: f64,
}

/// Which side of a field's domain was violated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Min(f64),
    Max(f64),
    /// The value is not a finite number at all.
    Finite,
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bound::Min(min) => write!(f, "minimum {min}"),
            Bound::Max(max) => write!(f, "maximum {max}"),
            Bound::Finite => write!(f, "must be finite"),
        }
    }
}

/// Failures of a single prediction request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// The predictor failed to load, returned an error, or panicked.
    #[error("prediction unavailable: {0}")]
    ModelUnavailable(String),
    /// The predictor returned a value that must not be displayed as a price.
    #[error("invalid prediction: model returned {0}, expected a finite non-negative value")]
    InvalidPrediction(f64),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::new(EXIT_INPUT, format!("Invalid input: {err}"))
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        let code = match err {
            PredictError::ModelUnavailable(_) => EXIT_MODEL,
            PredictError::InvalidPrediction(_) => EXIT_RUNTIME,
        };
        AppError::new(code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_errors_map_to_exit_codes() {
        let unavailable: AppError = PredictError::ModelUnavailable("missing".to_string()).into();
        assert_eq!(unavailable.exit_code(), EXIT_MODEL);

        let invalid: AppError = PredictError::InvalidPrediction(-5.0).into();
        assert_eq!(invalid.exit_code(), EXIT_RUNTIME);
        assert!(invalid.to_string().contains("-5"));
    }

    #[test]
    fn validation_error_names_field_and_bound() {
        let err = ValidationError {
            field: "bedrooms",
            bound: Bound::Max(10.0),
            value: 12.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("bedrooms"), "{msg}");
        assert!(msg.contains("maximum 10"), "{msg}");
    }
}
