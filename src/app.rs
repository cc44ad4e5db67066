//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - loads the model (once, failing fast)
//! - collects input and runs estimates
//! - prints reports and writes optional exports

use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::cli::{BatchArgs, Command, ModelArgs, PredictArgs, TuiArgs};
use crate::error::{AppError, EXIT_INPUT};
use crate::input::InputCollector;
use crate::io::BatchRecord;
use crate::report::PredictionReport;

pub mod setup;

/// Entry point for the `hp` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `hp` and `hp -m model.json` behave like `hp tui ...`. Clap requires a
    // subcommand name, so the argv list is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal, so it runs without a log subscriber.
    if !matches!(cli.command, Command::Tui(_)) {
        crate::logging::init(cli.verbose);
    }

    match cli.command {
        Command::Predict(args) => handle_predict(args),
        Command::Batch(args) => handle_batch(args),
        Command::Model(args) => handle_model(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let collector = InputCollector::new(args.estimate.policy);
    let features = collector.collect(&args.property.to_input())?;

    let pipeline = setup::build_pipeline(
        &args.model,
        &args.estimate,
        Duration::from_millis(args.latency_ms),
    )?;

    let result = match args.timeout_ms {
        Some(ms) => setup::predict_with_timeout(Arc::new(pipeline), features, Duration::from_millis(ms))?,
        None => pipeline.predict(&features)?,
    };

    if args.json {
        let report = PredictionReport::new(&features, &result, &args.estimate.currency);
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to encode JSON: {e}")))?;
        println!("{json}");
    } else {
        println!(
            "{}",
            crate::report::format_prediction(&features, &result, &args.estimate.currency)
        );
    }

    if let Some(path) = &args.export {
        let record = BatchRecord {
            line: 0,
            features,
            result,
        };
        crate::io::write_results_csv(path, &[record])?;
        info!(path = %path.display(), "wrote estimate");
    }

    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let pipeline = setup::build_pipeline(&args.model, &args.estimate, Duration::ZERO)?;
    let collector = InputCollector::new(args.estimate.policy);

    let file = File::open(&args.input).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to open CSV '{}': {e}", args.input.display()),
        )
    })?;
    let output = crate::io::estimate_csv(file, &collector, &pipeline)?;

    println!("{}", crate::report::format_batch(&output, &args.estimate.currency));
    for err in &output.row_errors {
        eprintln!("line {}: {}", err.line, err.message);
    }

    if let Some(path) = &args.export {
        crate::io::write_results_csv(path, &output.records)?;
        info!(path = %path.display(), rows = output.records.len(), "wrote batch results");
    }

    Ok(())
}

fn handle_model(args: ModelArgs) -> Result<(), AppError> {
    let predictor = crate::models::load_predictor(&setup::model_source(&args))?;
    print!("{}", crate::report::format_model_info(&predictor.info()));
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

/// Rewrite argv so `hp` defaults to `hp tui`.
///
/// Rules:
/// - `hp`                      -> `hp tui`
/// - `hp -m model.json ...`    -> `hp tui -m model.json ...`
/// - `hp -v predict ...`       -> unchanged (global `-v` may precede a subcommand)
/// - `hp -v -m model.json`     -> `hp -v tui -m model.json`
/// - `hp --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    // Leading verbosity flags are global and never decide the subcommand.
    let first = argv
        .iter()
        .skip(1)
        .position(|arg| !is_verbosity_flag(arg))
        .map(|i| i + 1);
    let Some(idx) = first else {
        argv.push("tui".to_string());
        return argv;
    };
    let arg = argv[idx].as_str();

    let is_top_level_help_or_version = matches!(arg, "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg, "predict" | "batch" | "model" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first remaining token is a flag, treat it as "tui flags".
    if arg.starts_with('-') {
        argv.insert(idx, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

/// `-v`, `-vv`, ... or `--verbose`.
fn is_verbosity_flag(arg: &str) -> bool {
    arg == "--verbose" || arg.strip_prefix('-').is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c == 'v'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(args(&["hp"])), args(&["hp", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(args(&["hp", "-m", "m.json"])),
            args(&["hp", "tui", "-m", "m.json"])
        );
    }

    #[test]
    fn subcommands_and_help_unchanged() {
        for v in [
            &["hp", "predict", "--area", "900"][..],
            &["hp", "--help"][..],
            &["hp", "batch", "-i", "x.csv"][..],
            &["hp", "-v", "predict", "--area", "900"][..],
            &["hp", "-vv", "--verbose", "model"][..],
            &["hp", "-v", "--help"][..],
        ] {
            assert_eq!(rewrite_args(args(v)), args(v));
        }
    }

    #[test]
    fn verbosity_before_flags_still_opens_tui() {
        assert_eq!(rewrite_args(args(&["hp", "-v"])), args(&["hp", "-v", "tui"]));
        assert_eq!(
            rewrite_args(args(&["hp", "-vv", "-m", "m.json"])),
            args(&["hp", "-vv", "tui", "-m", "m.json"])
        );
    }

    #[test]
    fn verbosity_before_subcommand_parses() {
        let argv = rewrite_args(args(&["hp", "-v", "predict", "--area", "900"]));
        let cli = crate::cli::Cli::try_parse_from(argv).unwrap();
        assert_eq!(cli.verbose, 1);
        let Command::Predict(predict) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(predict.property.area, Some(900.0));
    }

    #[test]
    fn verbosity_flag_shapes() {
        assert!(is_verbosity_flag("-v"));
        assert!(is_verbosity_flag("-vvv"));
        assert!(is_verbosity_flag("--verbose"));
        assert!(!is_verbosity_flag("-"));
        assert!(!is_verbosity_flag("-m"));
        assert!(!is_verbosity_flag("-vm"));
        assert!(!is_verbosity_flag("predict"));
    }
}
