//! Export estimates to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{AppError, EXIT_INPUT};
use crate::io::batch::BatchRecord;

const HEADER: [&str; 15] = [
    "line",
    "area_sqft",
    "bedrooms",
    "bathrooms",
    "floors",
    "age_years",
    "has_garage",
    "location_score",
    "luxury_level",
    "demand_index",
    "value",
    "price_per_area",
    "confidence_percent",
    "tier",
    "estimated_at",
];

/// Write estimates to a CSV file, replacing it if present.
pub fn write_results_csv(path: &Path, records: &[BatchRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, records)
}

pub fn write_results<W: Write>(writer: W, records: &[BatchRecord]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let write_err = |e: csv::Error| AppError::new(EXIT_INPUT, format!("Failed to write export CSV: {e}"));

    wtr.write_record(HEADER).map_err(write_err)?;

    for r in records {
        let f = &r.features;
        wtr.write_record([
            r.line.to_string(),
            format!("{}", f.area_sqft()),
            f.bedrooms().to_string(),
            f.bathrooms().to_string(),
            f.floors().to_string(),
            f.age_years().to_string(),
            if f.has_garage() { "yes" } else { "no" }.to_string(),
            f.location_score().to_string(),
            f.luxury_level().to_string(),
            f.demand_index().to_string(),
            format!("{:.2}", r.result.value),
            format!("{:.2}", r.result.price_per_area),
            r.result.confidence_percent.to_string(),
            r.result.tier.slug().to_string(),
            r.result.estimated_at.to_rfc3339(),
        ])
        .map_err(write_err)?;
    }

    wtr.flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
