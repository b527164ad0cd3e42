//! CSV export of prediction results
//!
//! One flat row per prediction. Appending to an existing file never
//! rewrites the header.

pub mod batch;

use chrono::{Local, NaiveDateTime};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing::debug;

use crate::errors::{PredictorError, Result};
use crate::pipeline::FiscalCategory;
use crate::types::{CompositionSample, PredictionResult};

pub use batch::{output_path_for, read_rows, run_batch, BatchFailure, BatchSummary};

/// Default export file name, relative to the working directory
pub const DEFAULT_EXPORT_FILE: &str = "octane_predictions.csv";

/// Timestamp layout used in the `timestamp` column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column order of every export file
pub const HEADER: [&str; 15] = [
    "timestamp",
    "PARAFINAS",
    "ISOPARAFINAS",
    "OLEFINAS",
    "NAFTENICOS",
    "AROMATICOS",
    "ETANOL",
    "MTBE",
    "ETBE",
    "Ox",
    "predicted_value",
    "rounded_value",
    "category",
    "nc_code",
    "fiscal_heading",
];

/// One exported row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub timestamp: String,
    #[serde(rename = "PARAFINAS")]
    pub parafinas: f64,
    #[serde(rename = "ISOPARAFINAS")]
    pub isoparafinas: f64,
    #[serde(rename = "OLEFINAS")]
    pub olefinas: f64,
    #[serde(rename = "NAFTENICOS")]
    pub naftenicos: f64,
    #[serde(rename = "AROMATICOS")]
    pub aromaticos: f64,
    #[serde(rename = "ETANOL")]
    pub etanol: f64,
    #[serde(rename = "MTBE")]
    pub mtbe: f64,
    #[serde(rename = "ETBE")]
    pub etbe: f64,
    #[serde(rename = "Ox")]
    pub ox: f64,
    pub predicted_value: f64,
    pub rounded_value: i64,
    pub category: FiscalCategory,
    pub nc_code: String,
    pub fiscal_heading: String,
}

impl ExportRecord {
    pub fn from_result(result: &PredictionResult) -> Self {
        let s = &result.inputs;
        Self {
            timestamp: result.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            parafinas: s.parafinas,
            isoparafinas: s.isoparafinas,
            olefinas: s.olefinas,
            naftenicos: s.naftenicos,
            aromaticos: s.aromaticos,
            etanol: s.etanol,
            mtbe: s.mtbe,
            etbe: s.etbe,
            ox: result.ox,
            predicted_value: result.predicted_value,
            rounded_value: result.rounded_value,
            category: result.classification.category,
            nc_code: result.classification.nc_code.clone(),
            fiscal_heading: result.classification.fiscal_heading.clone(),
        }
    }

    /// The composition this row was predicted from
    pub fn sample(&self) -> CompositionSample {
        CompositionSample {
            parafinas: self.parafinas,
            isoparafinas: self.isoparafinas,
            olefinas: self.olefinas,
            naftenicos: self.naftenicos,
            aromaticos: self.aromaticos,
            etanol: self.etanol,
            mtbe: self.mtbe,
            etbe: self.etbe,
        }
    }

    /// Parse the timestamp column back to local wall-clock time
    pub fn parsed_timestamp(&self) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).map_err(|e| {
            PredictorError::Export(format!("bad timestamp '{}': {}", self.timestamp, e))
        })
    }
}

fn has_content(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

/// Append one record, creating the file with a header if needed
pub fn append_record(path: &Path, record: &ExportRecord) -> Result<()> {
    let write_header = !has_content(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = WriterBuilder::new()
        .has_headers(write_header)
        .from_writer(file);
    writer.serialize(record)?;
    writer.flush()?;

    debug!(path = %path.display(), header = write_header, "export row appended");
    Ok(())
}

pub fn append_result(path: &Path, result: &PredictionResult) -> Result<()> {
    append_record(path, &ExportRecord::from_result(result))
}

/// Read every record of an export file
pub fn read_records(path: &Path) -> Result<Vec<ExportRecord>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Render records as an in-memory CSV document with a header
pub fn to_csv_string(records: &[ExportRecord]) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    if records.is_empty() {
        writer.write_record(HEADER)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| PredictorError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PredictorError::Export(e.to_string()))
}

/// File name suggested for a dashboard download
pub fn download_file_name() -> String {
    format!("octane_prediction_{}.csv", Local::now().format("%Y%m%d_%H%M%S"))
}
