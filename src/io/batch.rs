//! Batch estimation from a CSV of properties.
//!
//! Columns are named after the fields (`area_sqft`, `bedrooms`, ...); any column
//! may be missing or empty and then takes its default. Unknown columns are
//! ignored.
//!
//! Design goals:
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Order preserved**: output records follow input order even though
//!   estimates run in parallel

use std::io::Read;

use csv::{ReaderBuilder, Trim};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::{PredictionResult, PropertyFeatures};
use crate::error::{AppError, EXIT_INPUT};
use crate::input::{InputCollector, PropertyInput};
use crate::pipeline::PredictionPipeline;

/// A row that could not be estimated.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// A successfully estimated row.
#[derive(Debug, Clone)]
pub struct BatchRecord {
    pub line: usize,
    pub features: PropertyFeatures,
    pub result: PredictionResult,
}

#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub records: Vec<BatchRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Parse and validate every row of `reader`.
///
/// Returns the valid rows with their line numbers, the rejected rows, and the
/// number of data rows read.
pub fn read_properties<R: Read>(
    reader: R,
    collector: &InputCollector,
) -> Result<(Vec<(usize, PropertyFeatures)>, Vec<RowError>, usize), AppError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read CSV header: {e}")))?
        .clone();

    let mut rows = Vec::new();
    let mut errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, record) in rdr.records().enumerate() {
        rows_read += 1;
        // Header is line 1.
        let fallback_line = idx + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                errors.push(RowError {
                    line: fallback_line,
                    message: format!("unreadable row: {e}"),
                });
                continue;
            }
        };
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);

        let raw: PropertyInput = match record.deserialize(Some(&headers)) {
            Ok(raw) => raw,
            Err(e) => {
                errors.push(RowError {
                    line,
                    message: format!("bad value: {e}"),
                });
                continue;
            }
        };

        match collector.collect(&raw) {
            Ok(features) => rows.push((line, features)),
            Err(e) => errors.push(RowError {
                line,
                message: e.to_string(),
            }),
        }
    }

    Ok((rows, errors, rows_read))
}

/// Estimate every valid row of `reader` with a shared pipeline.
pub fn estimate_csv<R: Read>(
    reader: R,
    collector: &InputCollector,
    pipeline: &PredictionPipeline,
) -> Result<BatchOutput, AppError> {
    let (rows, mut row_errors, rows_read) = read_properties(reader, collector)?;

    let outcomes: Vec<Result<BatchRecord, RowError>> = rows
        .par_iter()
        .map(|&(line, features)| {
            pipeline
                .predict(&features)
                .map(|result| BatchRecord { line, features, result })
                .map_err(|e| RowError {
                    line,
                    message: e.to_string(),
                })
        })
        .collect();

    let mut records = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(record) => records.push(record),
            Err(err) => row_errors.push(err),
        }
    }
    row_errors.sort_by_key(|e| e.line);

    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), "some rows could not be estimated");
    }
    info!(rows_read, estimated = records.len(), "batch complete");

    Ok(BatchOutput {
        records,
        row_errors,
        rows_read,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureVector, InputPolicy};
    use crate::models::{EstimateError, ModelInfo, Predictor};
    use std::sync::Arc;

    /// 2000 per sqft, but refuses houses older than 90 years.
    struct Appraiser;

    impl Predictor for Appraiser {
        fn estimate(&self, vector: &FeatureVector) -> Result<f64, EstimateError> {
            let v = vector.as_slice();
            if v[4] > 90.0 {
                return Err("no comparables".into());
            }
            Ok(v[0] * 2000.0)
        }

        fn info(&self) -> ModelInfo {
            ModelInfo {
                kind: "test",
                name: "appraiser".to_string(),
                parameters: Vec::new(),
                endpoint: None,
            }
        }
    }

    const CSV: &str = "\
id,area_sqft,bedrooms,bathrooms,floors,age_years,has_garage,location_score
a,1500,3,2,1,5,no,5
b,4000,5,4,2,10,yes,9
c,abc,3,2,1,5,no,5
d,2000,,,,,,
e,2000,3,2,1,95,no,5
f,2000,11,2,1,5,no,5
";

    #[test]
    fn reads_rows_with_defaults_and_errors() {
        let collector = InputCollector::new(InputPolicy::Reject);
        let (rows, errors, rows_read) = read_properties(CSV.as_bytes(), &collector).unwrap();
        assert_eq!(rows_read, 6);
        assert_eq!(rows.len(), 4);

        let (line, d) = rows[2];
        assert_eq!(line, 5);
        assert_eq!(d.area_sqft(), 2000.0);
        assert_eq!(d.bedrooms(), 3);
        assert_eq!(d.demand_index(), 6);
        assert!(rows[1].1.has_garage());

        let lines: Vec<usize> = errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![4, 7]);
        assert!(errors[1].message.contains("bedrooms"));
    }

    #[test]
    fn clamp_policy_keeps_out_of_range_rows() {
        let collector = InputCollector::new(InputPolicy::Clamp);
        let (rows, errors, _) = read_properties(CSV.as_bytes(), &collector).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(errors.len(), 1);
        assert_eq!(rows[4].1.bedrooms(), 10);
    }

    #[test]
    fn estimates_in_input_order_and_reports_failures() {
        let pipeline = PredictionPipeline::new(Arc::new(Appraiser));
        let collector = InputCollector::new(InputPolicy::Reject);
        let out = estimate_csv(CSV.as_bytes(), &collector, &pipeline).unwrap();

        assert_eq!(out.rows_read, 6);
        let lines: Vec<usize> = out.records.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3, 5]);
        assert_eq!(out.records[0].result.value, 3_000_000.0);
        assert_eq!(out.records[1].result.value, 8_000_000.0);

        let error_lines: Vec<usize> = out.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(error_lines, vec![4, 6, 7]);
        assert!(out.row_errors[1].message.contains("prediction unavailable"));
    }

    #[test]
    fn header_only_file_is_empty_batch() {
        let pipeline = PredictionPipeline::new(Arc::new(Appraiser));
        let out = estimate_csv("area_sqft\n".as_bytes(), &InputCollector::default(), &pipeline).unwrap();
        assert_eq!(out.rows_read, 0);
        assert!(out.records.is_empty());
    }
}
