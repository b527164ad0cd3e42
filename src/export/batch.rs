//! Batch prediction over a CSV of samples
//!
//! Input columns are the composition names (accents and case tolerated).
//! Rows that fail validation are collected, not fatal.

use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::ExportRecord;
use crate::errors::{PredictorError, Result};
use crate::pipeline::{PredictionPipeline, RawInputs};

/// A row that could not be predicted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    /// 1-based data row (the header is not counted)
    pub row: usize,
    pub kind: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<BatchFailure>,
    /// Predictions per category name
    pub categories: BTreeMap<String, usize>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// `<dir>/<stem>_predictions.csv` next to the input
pub fn output_path_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "batch".to_string());
    input.with_file_name(format!("{}_predictions.csv", stem))
}

/// Read every data row as raw `name -> value` inputs
pub fn read_rows(path: &Path) -> Result<Vec<RawInputs>> {
    // short rows surface as a missing variable for that row
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let raw: RawInputs = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
            .collect();
        rows.push(raw);
    }
    Ok(rows)
}

/// Predict every row of `input` and write results to `output`.
///
/// `on_progress` is called after each row with `(done, total)`.
pub fn run_batch(
    pipeline: &PredictionPipeline,
    input: &Path,
    output: &Path,
    on_progress: &mut dyn FnMut(usize, usize),
) -> Result<BatchSummary> {
    let rows = read_rows(input)?;
    let total = rows.len();
    if total == 0 {
        return Err(PredictorError::Export(format!(
            "{} contains no data rows",
            input.display()
        )));
    }

    let mut writer = WriterBuilder::new().from_path(output)?;
    let mut summary = BatchSummary {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        total,
        succeeded: 0,
        failures: Vec::new(),
        categories: BTreeMap::new(),
    };

    for (index, raw) in rows.iter().enumerate() {
        let row = index + 1;
        match pipeline.predict(raw) {
            Ok(result) => {
                writer.serialize(ExportRecord::from_result(&result))?;
                summary.succeeded += 1;
                *summary
                    .categories
                    .entry(result.classification.category.to_string())
                    .or_insert(0) += 1;
            }
            Err(e) if e.is_validation() => {
                warn!(row, error = %e, "batch row rejected");
                summary.failures.push(BatchFailure {
                    row,
                    kind: e.kind().to_string(),
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
        on_progress(row, total);
    }
    writer.flush()?;

    info!(
        input = %input.display(),
        output = %output.display(),
        succeeded = summary.succeeded,
        failed = summary.failed(),
        "batch finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::read_records;
    use crate::model::{ConstantRegressor, ModelService};
    use std::fs;
    use std::sync::Arc;

    const HEADER: &str = "PARAFINAS,ISOPARAFINAS,OLEFINAS,NAFTÉNICOS,AROMÁTICOS,ETANOL,MTBE,ETBE";

    fn pipeline() -> PredictionPipeline {
        let model = ModelService::with_regressor(
            "fixed",
            &["PARAFINAS", "Ox"],
            Box::new(ConstantRegressor::new(96.4)),
        )
        .unwrap();
        PredictionPipeline::new(Arc::new(model))
    }

    #[test]
    fn test_output_path_uses_stem() {
        assert_eq!(
            output_path_for(Path::new("/data/lote_marzo.csv")),
            PathBuf::from("/data/lote_marzo_predictions.csv")
        );
    }

    #[test]
    fn test_batch_continues_past_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("samples.csv");
        fs::write(
            &input,
            format!(
                "{}\n10.5,32.0,8.5,6.2,38.0,4.8,0,0\n10.5,abc,8.5,6.2,38.0,4.8,0,0\n12,30,9,7,35,2,5,0\n",
                HEADER
            ),
        )
        .unwrap();
        let output = output_path_for(&input);

        let mut calls = Vec::new();
        let summary =
            run_batch(&pipeline(), &input, &output, &mut |done, total| calls.push((done, total)))
                .unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].row, 2);
        assert_eq!(summary.failures[0].kind, "invalid_number");
        assert_eq!(summary.categories["PREMIUM"], 2);
        assert_eq!(calls, vec![(1, 3), (2, 3), (3, 3)]);

        let records = read_records(&output).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].ox, 7.0);
    }

    #[test]
    fn test_short_row_fails_alone() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ragged.csv");
        fs::write(
            &input,
            format!(
                "{}\n10.5,32.0,8.5,6.2,38.0,4.8,0,0\n10.5,32,8.5\n12,30,9,7,35,2,5,0\n",
                HEADER
            ),
        )
        .unwrap();
        let output = output_path_for(&input);

        let summary = run_batch(&pipeline(), &input, &output, &mut |_, _| {}).unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].row, 2);
        assert_eq!(summary.failures[0].kind, "missing_variable");
        assert!(summary.failures[0].error.contains("NAFTENICOS"));
        assert_eq!(read_records(&output).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_column_reported_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("short.csv");
        fs::write(&input, "PARAFINAS,ISOPARAFINAS\n10,30\n").unwrap();
        let output = dir.path().join("out.csv");

        let summary = run_batch(&pipeline(), &input, &output, &mut |_, _| {}).unwrap();
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failures[0].kind, "missing_variable");
        assert!(summary.failures[0].error.contains("OLEFINAS"));
    }

    #[test]
    fn test_empty_input_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.csv");
        fs::write(&input, format!("{}\n", HEADER)).unwrap();
        let output = dir.path().join("out.csv");
        assert!(run_batch(&pipeline(), &input, &output, &mut |_, _| {}).is_err());
    }
}
