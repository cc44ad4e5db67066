//! Terminal formatting for estimates.

use crate::domain::{BannerLevel, PredictionResult, PropertyFeatures};
use crate::io::BatchOutput;
use crate::models::ModelInfo;

/// Format `value` as `"<symbol> 1,234,567.89"`.
pub fn format_currency(value: f64, symbol: &str) -> String {
    let grouped = group_thousands(value);
    if symbol.is_empty() {
        grouped
    } else {
        format!("{symbol} {grouped}")
    }
}

/// Two decimals with `,` between each group of three integer digits.
pub fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if value.is_sign_negative() && fixed != "0.00" {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('.');
    out.push_str(frac_part);
    out
}

/// `[#########...]` bar, `width` cells wide.
pub fn confidence_bar(percent: u8, width: usize) -> String {
    let filled = (usize::from(percent.min(100)) * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

fn banner_tag(level: BannerLevel) -> &'static str {
    match level {
        BannerLevel::Info => "INFO",
        BannerLevel::Warning => "WARN",
        BannerLevel::Error => "HIGH",
    }
}

/// Full text report for one estimate.
pub fn format_prediction(features: &PropertyFeatures, result: &PredictionResult, currency: &str) -> String {
    let mut out = String::new();

    out.push_str("=== hp - House Price Estimate ===\n");
    out.push_str(&format!(
        "Estimated Property Value: {}\n",
        format_currency(result.value, currency)
    ));
    out.push('\n');
    out.push_str(&format!(
        "{:<24} {}\n",
        "Price per Sqft:",
        format_currency(result.price_per_area, currency)
    ));
    out.push_str(&format!("{:<24} {}\n", "Bedrooms:", features.bedrooms()));
    out.push_str(&format!(
        "{:<24} {}/10\n",
        "Location Score Impact:",
        features.location_score()
    ));
    out.push('\n');
    out.push_str(&format!(
        "Model Confidence: {} {}% (display only, not a statistical confidence)\n",
        confidence_bar(result.confidence_percent, 30),
        result.confidence_percent
    ));
    out.push_str(&format!(
        "Price Position: [{}] {}\n",
        banner_tag(result.tier.banner_level()),
        result.tier.display_name()
    ));

    out
}

/// Table of batch estimates plus a one-line summary.
pub fn format_batch(output: &BatchOutput, currency: &str) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>6} {:>8} {:>5} {:>6} {:>20} {:>14} {:<26}\n",
            "line", "area", "beds", "garage", "value", "per_sqft", "tier"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<6} {:-<8} {:-<5} {:-<6} {:-<20} {:-<14} {:-<26}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in &output.records {
        out.push_str(
            format!(
                "{:>6} {:>8.0} {:>5} {:>6} {:>20} {:>14} {:<26}\n",
                r.line,
                r.features.area_sqft(),
                r.features.bedrooms(),
                if r.features.has_garage() { "yes" } else { "no" },
                format_currency(r.result.value, currency),
                format_currency(r.result.price_per_area, currency),
                r.result.tier.display_name(),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push_str(&format!(
        "\nEstimated {} of {} rows ({} skipped)\n",
        output.records.len(),
        output.rows_read,
        output.row_errors.len()
    ));
    out
}

/// Summary of the loaded model.
pub fn format_model_info(info: &ModelInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!("Model: {} ({})\n", info.name, info.kind));
    if let Some(endpoint) = &info.endpoint {
        out.push_str(&format!("Endpoint: {endpoint}\n"));
    }
    if !info.parameters.is_empty() {
        out.push_str("Parameters:\n");
        for (name, value) in &info.parameters {
            out.push_str(&format!("  {name:<16} {value:>16.4}\n"));
        }
    }
    out.push_str("Inputs recorded but not used by the model: luxury_level, demand_index\n");
    out
}
