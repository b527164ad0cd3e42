//! Prediction pipeline shared by the REST API, dashboard and REPL
//!
//! validate -> derive Ox -> sum check -> model -> round -> classify -> assemble.
//! The model is injected at construction and never mutated.

pub mod catalog;
pub mod classify;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::errors::Result;
use crate::model::ModelService;
use crate::types::{
    CompositionSample, ConfidenceBand, PredictionResult, RangeWarning, SumAdvisory,
};

pub use catalog::{category_rows, range_rows, CategoryRow, RangeRow};
pub use classify::{
    classify, critical_zone, round_half_even, ClassificationBasis, ClassificationPolicy,
    FiscalCategory, FiscalClassification, CONFIDENCE_MARGIN, CRITICAL_MARGIN, PREMIUM_MAX,
    REGULAR_MAX, SUM_TOLERANCE,
};
pub use validation::{sum_check, validate, RangeTable, RawInputs, ValidRange, ValidatedSample};

/// Tunable constants of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelinePolicy {
    pub classification: ClassificationPolicy,
    pub confidence_margin: f64,
    pub sum_tolerance: f64,
    pub ranges: RangeTable,
}

impl Default for PipelinePolicy {
    fn default() -> Self {
        Self {
            classification: ClassificationPolicy::default(),
            confidence_margin: CONFIDENCE_MARGIN,
            sum_tolerance: SUM_TOLERANCE,
            ranges: RangeTable::default(),
        }
    }
}

/// Advisory checks that can run before the model is called
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub ox: f64,
    pub component_sum: f64,
    pub sum_advisory: Option<SumAdvisory>,
    pub out_of_range: Vec<RangeWarning>,
}

/// The single validated entry point for predictions
pub struct PredictionPipeline {
    model: Arc<ModelService>,
    policy: PipelinePolicy,
}

impl PredictionPipeline {
    pub fn new(model: Arc<ModelService>) -> Self {
        Self::with_policy(model, PipelinePolicy::default())
    }

    pub fn with_policy(model: Arc<ModelService>, policy: PipelinePolicy) -> Self {
        Self { model, policy }
    }

    pub fn model(&self) -> &ModelService {
        &self.model
    }

    pub fn policy(&self) -> &PipelinePolicy {
        &self.policy
    }

    /// Validate raw inputs and predict
    pub fn predict(&self, raw: &RawInputs) -> Result<PredictionResult> {
        let validated = validate(raw, &self.policy.ranges)?;
        self.assemble(validated.sample, validated.warnings)
    }

    /// Predict an already-typed sample (range checks still apply)
    pub fn predict_sample(&self, sample: &CompositionSample) -> Result<PredictionResult> {
        let warnings = self.policy.ranges.check(sample);
        self.assemble(*sample, warnings)
    }

    /// Ox, component sum and advisories without invoking the model
    pub fn preview(&self, sample: &CompositionSample) -> Preview {
        Preview {
            ox: sample.ox(),
            component_sum: sample.component_sum(),
            sum_advisory: sum_check(sample, self.policy.sum_tolerance),
            out_of_range: self.policy.ranges.check(sample),
        }
    }

    fn assemble(
        &self,
        sample: CompositionSample,
        out_of_range: Vec<RangeWarning>,
    ) -> Result<PredictionResult> {
        let predicted_value = self.model.predict(&sample)?;
        let policy = &self.policy.classification;
        let classification = classify(predicted_value, policy);

        debug!(
            predicted = predicted_value,
            category = %classification.category,
            out_of_range = out_of_range.len(),
            "prediction assembled"
        );

        Ok(PredictionResult {
            id: Uuid::new_v4(),
            timestamp: chrono::Local::now(),
            inputs: sample,
            ox: sample.ox(),
            component_sum: sample.component_sum(),
            predicted_value,
            rounded_value: round_half_even(predicted_value) as i64,
            confidence_band: ConfidenceBand::around(predicted_value, self.policy.confidence_margin),
            critical_zone: critical_zone(predicted_value, policy),
            classification,
            out_of_range,
            sum_advisory: sum_check(&sample, self.policy.sum_tolerance),
        })
    }
}
