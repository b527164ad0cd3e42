//! End-to-end tests of the prediction pipeline
//!
//! Uses the shipped demo artifact and in-code constant models; no server needed.

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use std::path::PathBuf;
use std::sync::Arc;

use octanebuddy::model::{ConstantRegressor, LinearModel, ModelArtifact, ModelSpec};
use octanebuddy::pipeline::{
    classify, ClassificationBasis, ClassificationPolicy, PipelinePolicy,
};
use octanebuddy::types::Bound;
use octanebuddy::{
    Component, CompositionSample, FiscalCategory, ModelService, PredictionPipeline,
    PredictorError, RawInputs, Variable,
};

fn demo_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("models")
        .join("octane_gb.json")
}

fn constant_pipeline(value: f64) -> PredictionPipeline {
    let model = ModelService::with_regressor(
        "const",
        &["PARAFINAS", "ETANOL", "Ox"],
        Box::new(ConstantRegressor::new(value)),
    )
    .unwrap();
    PredictionPipeline::new(Arc::new(model))
}

fn raw_example() -> RawInputs {
    RawInputs::from(&CompositionSample::example())
}

#[test]
fn test_demo_artifact_predicts_example() {
    let model = ModelService::load(&demo_model_path()).unwrap();
    assert_eq!(model.info().variables.len(), 9);
    assert_eq!(model.info().algorithm, "Gradient Boosting Regressor");

    let pipeline = PredictionPipeline::new(Arc::new(model));
    let result = pipeline.predict(&raw_example()).unwrap();

    assert!((result.predicted_value - 96.2).abs() < 1e-9);
    assert_eq!(result.rounded_value, 96);
    assert_eq!(result.classification.category, FiscalCategory::Premium);
    assert!(result.critical_zone.is_none());
    assert!(result.sum_advisory.is_none());
    assert!((result.ox - 4.8).abs() < 1e-12);

    // AROMATICOS 38 lies above the training maximum
    assert_eq!(result.out_of_range.len(), 1);
    let warning = &result.out_of_range[0];
    assert_eq!(warning.variable, Variable::Component(Component::Aromaticos));
    assert_eq!(warning.bound, Bound::Above);
}

#[test]
fn test_confidence_band_follows_policy() {
    let model = ModelService::with_regressor(
        "const",
        &["Ox"],
        Box::new(ConstantRegressor::new(96.0)),
    )
    .unwrap();
    let policy = PipelinePolicy {
        confidence_margin: 0.06,
        ..PipelinePolicy::default()
    };
    let result = PredictionPipeline::with_policy(Arc::new(model), policy)
        .predict(&raw_example())
        .unwrap();

    assert!((result.confidence_band.low - 95.94).abs() < 1e-9);
    assert!((result.confidence_band.high - 96.06).abs() < 1e-9);
}

#[test]
fn test_first_missing_variable_is_reported() {
    let raw = RawInputs::new()
        .with("PARAFINAS", 10.0)
        .with("ISOPARAFINAS", 30.0);
    let err = constant_pipeline(95.0).predict(&raw).unwrap_err();
    assert!(matches!(err, PredictorError::MissingVariable { ref name } if name == "OLEFINAS"));
    assert!(err.is_validation());
}

#[test]
fn test_invalid_number_is_rejected() {
    let mut raw = raw_example();
    raw.insert("MTBE", "doce");
    let err = constant_pipeline(95.0).predict(&raw).unwrap_err();
    match err {
        PredictorError::InvalidNumber { name, value } => {
            assert_eq!(name, "MTBE");
            assert_eq!(value, "doce");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_caller_supplied_ox_is_ignored() {
    let raw = raw_example().with("Ox", 99.0);
    let result = constant_pipeline(95.0).predict(&raw).unwrap();
    assert!((result.ox - 4.8).abs() < 1e-12);
}

#[test]
fn test_accented_and_lowercase_names_resolve() {
    let sample = CompositionSample::example();
    let raw = RawInputs::new()
        .with("parafinas", sample.parafinas)
        .with("Isoparafinas", sample.isoparafinas)
        .with("OLEFINAS", sample.olefinas)
        .with("NAFTÉNICOS", sample.naftenicos)
        .with("AROMÁTICOS", sample.aromaticos)
        .with("etanol", sample.etanol)
        .with("MTBE", sample.mtbe)
        .with("ETBE", "0");
    let result = constant_pipeline(95.0).predict(&raw).unwrap();
    assert_eq!(result.inputs, sample);
}

#[test]
fn test_sum_advisory_threshold() {
    let pipeline = constant_pipeline(95.0);
    let with_aromaticos = |value: f64| {
        let sample = CompositionSample::example().with(Component::Aromaticos, value);
        pipeline.predict_sample(&sample).unwrap().sum_advisory
    };

    // example totals 100 with AROMATICOS = 38
    assert!(with_aromaticos(33.0).is_none());
    assert!(with_aromaticos(31.0).is_some());
    assert!(with_aromaticos(43.5).is_some());
    assert!(with_aromaticos(42.0).is_none());
}

#[test]
fn test_critical_zone_reported_near_boundary() {
    let result = constant_pipeline(94.6).predict(&raw_example()).unwrap();
    assert_eq!(result.classification.category, FiscalCategory::Regular);
    let zone = result.critical_zone.unwrap();
    assert_eq!(zone.boundary, 95.0);

    let result = constant_pipeline(96.5).predict(&raw_example()).unwrap();
    assert!(result.critical_zone.is_none());
}

#[test]
fn test_rounded_basis_changes_boundary_decision() {
    let raw = ClassificationPolicy::default();
    let rounded = ClassificationPolicy {
        basis: ClassificationBasis::Rounded,
        ..raw
    };
    assert_eq!(classify(94.6, &raw).category, FiscalCategory::Regular);
    assert_eq!(classify(94.6, &rounded).category, FiscalCategory::Premium);
    assert_eq!(classify(98.4, &rounded).category, FiscalCategory::Premium);
    assert_eq!(classify(98.4, &raw).category, FiscalCategory::Super);

    // exact halves round to the even neighbour
    assert_eq!(classify(94.5, &rounded).category, FiscalCategory::Regular);
    assert_eq!(classify(95.5, &rounded).category, FiscalCategory::Premium);
    let result = constant_pipeline(94.5).predict(&raw_example()).unwrap();
    assert_eq!(result.rounded_value, 94);
}

#[test]
fn test_duplicate_alias_is_rejected() {
    let raw = raw_example().with("aromáticos", 30.0);
    let err = constant_pipeline(95.0).predict(&raw).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.kind(), "duplicate_variable");
    assert_eq!(err.variable(), Some("AROMATICOS"));
}

#[test]
fn test_linear_artifact_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("linear.json");
    let mut variables: Vec<String> = Component::ALL.iter().map(|c| c.name().to_string()).collect();
    variables.push("Ox".to_string());

    let mut coefficients = vec![0.0; 9];
    coefficients[8] = 0.5; // Ox
    ModelArtifact {
        name: "linear".to_string(),
        variables,
        model: ModelSpec::Linear(LinearModel {
            intercept: 92.0,
            coefficients,
        }),
        metadata: Default::default(),
    }
    .save(&path)
    .unwrap();

    let model = ModelService::load(&path).unwrap();
    let result = PredictionPipeline::new(Arc::new(model))
        .predict(&raw_example())
        .unwrap();
    assert!((result.predicted_value - 94.4).abs() < 1e-9);
}

#[test]
fn test_malformed_artifact_is_model_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        ModelService::load(&path),
        Err(PredictorError::ModelUnavailable(_))
    ));
    assert!(matches!(
        ModelService::load(&dir.path().join("missing.json")),
        Err(PredictorError::ModelUnavailable(_))
    ));
}

/// Percentage in [0, 100) with two decimals
#[derive(Debug, Clone, Copy)]
struct Percent(f64);

impl Arbitrary for Percent {
    fn arbitrary(g: &mut Gen) -> Self {
        Percent((u16::arbitrary(g) % 10_000) as f64 / 100.0)
    }
}

#[quickcheck]
fn prop_ox_is_sum_of_oxygenates(etanol: Percent, mtbe: Percent, etbe: Percent) -> bool {
    let sample = CompositionSample::example()
        .with(Component::Etanol, etanol.0)
        .with(Component::Mtbe, mtbe.0)
        .with(Component::Etbe, etbe.0);
    let result = constant_pipeline(95.0).predict_sample(&sample).unwrap();
    (result.ox - (etanol.0 + mtbe.0 + etbe.0)).abs() < 1e-9
}

#[quickcheck]
fn prop_component_sum_counts_oxygenates_once(values: Vec<Percent>) -> bool {
    let mut sample = CompositionSample::default();
    for (component, value) in Component::ALL.iter().zip(values.iter()) {
        sample.set(*component, value.0);
    }
    let expected: f64 = Component::ALL.iter().map(|c| sample.get(*c)).sum();
    (sample.component_sum() - expected).abs() < 1e-9
}

fn rank(category: FiscalCategory) -> usize {
    FiscalCategory::ALL
        .iter()
        .position(|c| *c == category)
        .unwrap_or(usize::MAX)
}

#[quickcheck]
fn prop_classification_is_monotonic(a: i32, b: i32) -> bool {
    // tenths of RON around the boundaries
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let lo = 80.0 + (lo % 400) as f64 / 10.0;
    let hi = lo.max(80.0 + (hi % 400) as f64 / 10.0);
    let policy = ClassificationPolicy::default();
    rank(classify(lo, &policy).category) <= rank(classify(hi, &policy).category)
}

#[quickcheck]
fn prop_every_finite_value_has_a_category(value: f64) -> bool {
    if !value.is_finite() {
        return true;
    }
    let category = classify(value, &ClassificationPolicy::default()).category;
    FiscalCategory::ALL.contains(&category)
}
