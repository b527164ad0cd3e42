//! CSV export and batch prediction against real files

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use octanebuddy::export::{
    self, append_result, output_path_for, read_records, run_batch, to_csv_string,
    ExportRecord, HEADER,
};
use octanebuddy::model::ConstantRegressor;
use octanebuddy::{CompositionSample, FiscalCategory, ModelService, PredictionPipeline};

fn pipeline(value: f64) -> PredictionPipeline {
    let model = ModelService::with_regressor(
        "const",
        &["AROMATICOS", "Ox"],
        Box::new(ConstantRegressor::new(value)),
    )
    .unwrap();
    PredictionPipeline::new(Arc::new(model))
}

#[test]
fn test_append_writes_header_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reports").join("octane_predictions.csv");

    let first = pipeline(93.2)
        .predict_sample(&CompositionSample::example())
        .unwrap();
    let second = pipeline(99.1)
        .predict_sample(&CompositionSample::example())
        .unwrap();
    append_result(&path, &first).unwrap();
    append_result(&path, &second).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let header = HEADER.join(",");
    assert_eq!(contents.matches(&header).count(), 1);
    assert!(contents.starts_with(&header));

    let records = read_records(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].category, FiscalCategory::Regular);
    assert_eq!(records[0].nc_code, "2710.12.41");
    assert_eq!(records[1].category, FiscalCategory::Super);
    assert_eq!(records[1].rounded_value, 99);
    assert_eq!(records[1].sample(), CompositionSample::example());
    assert!(records[1].parsed_timestamp().is_ok());
}

#[test]
fn test_download_body_has_header_and_one_row() {
    let result = pipeline(96.0)
        .predict_sample(&CompositionSample::example())
        .unwrap();
    let body = to_csv_string(&[ExportRecord::from_result(&result)]).unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], HEADER.join(","));
    assert!(lines[1].contains("PREMIUM"));
    assert!(export::download_file_name().ends_with(".csv"));
}

#[test]
fn test_batch_continues_past_bad_rows() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("lote.csv");
    fs::write(
        &input,
        "PARAFINAS,ISOPARAFINAS,OLEFINAS,NAFTÉNICOS,AROMÁTICOS,ETANOL,MTBE,ETBE\n\
         10.5,32.0,8.5,6.2,38.0,4.8,0,0\n\
         10.5,32.0,abc,6.2,38.0,4.8,0,0\n\
         11.0,30.0,9.0,6.0,36.0,0,8.0,0\n",
    )
    .unwrap();
    let output = output_path_for(&input);
    assert_eq!(output, dir.path().join("lote_predictions.csv"));

    let mut progress = Vec::new();
    let summary = run_batch(&pipeline(96.0), &input, &output, &mut |done, total| {
        progress.push((done, total))
    })
    .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.failures[0].row, 2);
    assert_eq!(summary.failures[0].kind, "invalid_number");
    assert_eq!(summary.categories.get("PREMIUM"), Some(&2));
    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);

    let records = read_records(&output).unwrap();
    assert_eq!(records.len(), 2);
    assert!((records[1].ox - 8.0).abs() < 1e-12);
}

#[test]
fn test_batch_short_row_does_not_abort() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("irregular.csv");
    fs::write(
        &input,
        "PARAFINAS,ISOPARAFINAS,OLEFINAS,NAFTENICOS,AROMATICOS,ETANOL,MTBE,ETBE\n\
         10.5,32.0,8.5,6.2,38.0,4.8,0,0\n\
         10.5,32,8.5\n\
         11.0,30.0,9.0,6.0,36.0,0,8.0,0\n",
    )
    .unwrap();
    let output = output_path_for(&input);

    let summary = run_batch(&pipeline(96.0), &input, &output, &mut |_, _| {}).unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.failures[0].row, 2);
    assert_eq!(summary.failures[0].kind, "missing_variable");
    assert_eq!(read_records(&output).unwrap().len(), 2);
}

#[test]
fn test_batch_missing_column_rejects_every_row() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("incompleto.csv");
    fs::write(&input, "PARAFINAS,ISOPARAFINAS\n10,30\n11,31\n").unwrap();

    let summary = run_batch(
        &pipeline(96.0),
        &input,
        &dir.path().join("out.csv"),
        &mut |_, _| {},
    )
    .unwrap();
    assert_eq!(summary.succeeded, 0);
    assert!(summary.failures.iter().all(|f| f.kind == "missing_variable"));
}

#[test]
fn test_batch_empty_input_is_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("vacio.csv");
    fs::write(&input, "PARAFINAS,ISOPARAFINAS\n").unwrap();
    let err = run_batch(
        &pipeline(96.0),
        &input,
        &dir.path().join("out.csv"),
        &mut |_, _| {},
    )
    .unwrap_err();
    assert_eq!(err.kind(), "export_error");
}
