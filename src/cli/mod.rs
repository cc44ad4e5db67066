//! Command-line parsing for the house price estimator.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! estimation and presentation. Deployment settings can also come from `HP_*`
//! environment variables (or a `.env` file).

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::InputPolicy;
use crate::input::{PropertyInput, parse_garage};

/// Default location of the model artifact.
pub const DEFAULT_MODEL_PATH: &str = "model/model.json";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hp", version, about = "House price estimator")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate one property and print the report.
    Predict(PredictArgs),
    /// Estimate every row of a properties CSV.
    Batch(BatchArgs),
    /// Load the model and describe it.
    Model(ModelArgs),
    /// Launch the interactive form.
    Tui(TuiArgs),
}

/// Where to load the model from.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Path to a JSON linear model artifact.
    #[arg(short = 'm', long = "model", env = "HP_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// HTTP inference endpoint; takes precedence over `--model` when set.
    #[arg(long, env = "HP_MODEL_URL")]
    pub model_url: Option<String>,

    /// Per-request timeout for the remote endpoint (milliseconds).
    #[arg(long, default_value_t = 10_000)]
    pub model_timeout_ms: u64,
}

/// How input is validated and results are shown.
#[derive(Debug, Args, Clone)]
pub struct EstimateArgs {
    /// Out-of-range handling: clamp to the nearest bound, or reject.
    #[arg(long, value_enum, env = "HP_INPUT_POLICY", default_value_t = InputPolicy::Clamp)]
    pub policy: InputPolicy,

    /// Currency symbol for formatted values.
    #[arg(long, env = "HP_CURRENCY", default_value = "₹")]
    pub currency: String,

    /// Seed for the (cosmetic) confidence figure.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Property attributes. Omitted fields take their defaults.
#[derive(Debug, Args, Clone, Default)]
pub struct PropertyArgs {
    /// Area in square feet [500, 10000].
    #[arg(long, allow_negative_numbers = true)]
    pub area: Option<f64>,

    /// Bedrooms [1, 10].
    #[arg(long, allow_negative_numbers = true)]
    pub bedrooms: Option<i64>,

    /// Bathrooms [1, 10].
    #[arg(long, allow_negative_numbers = true)]
    pub bathrooms: Option<i64>,

    /// Floors [1, 5].
    #[arg(long, allow_negative_numbers = true)]
    pub floors: Option<i64>,

    /// Age in years [0, 100].
    #[arg(long, allow_negative_numbers = true)]
    pub age: Option<i64>,

    /// Garage available (yes/no).
    #[arg(long, value_parser = parse_garage)]
    pub garage: Option<bool>,

    /// Location score [1, 10].
    #[arg(long, allow_negative_numbers = true)]
    pub location_score: Option<i64>,

    /// Luxury level [1, 10]. Recorded only; not used by the model.
    #[arg(long, allow_negative_numbers = true)]
    pub luxury_level: Option<i64>,

    /// Market demand index [1, 10]. Recorded only; not used by the model.
    #[arg(long, allow_negative_numbers = true)]
    pub demand_index: Option<i64>,
}

impl PropertyArgs {
    pub fn to_input(&self) -> PropertyInput {
        PropertyInput {
            area_sqft: self.area,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            floors: self.floors,
            age_years: self.age,
            has_garage: self.garage,
            location_score: self.location_score,
            luxury_level: self.luxury_level,
            demand_index: self.demand_index,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub estimate: EstimateArgs,

    #[command(flatten)]
    pub property: PropertyArgs,

    /// Print the estimate as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Also write the estimate to a CSV file.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Simulated analysis delay before estimating (milliseconds).
    #[arg(long, env = "HP_LATENCY_MS", default_value_t = 0)]
    pub latency_ms: u64,

    /// Give up if no estimate arrives within this many milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub estimate: EstimateArgs,

    /// Properties CSV with a header row naming the fields.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Write per-row estimates to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub estimate: EstimateArgs,

    /// Simulated analysis delay before each estimate (milliseconds).
    #[arg(long, env = "HP_LATENCY_MS", default_value_t = 2000)]
    pub latency_ms: u64,
}
