//! Prediction result types shared by every front-end

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::classify::FiscalClassification;
use crate::types::sample::{CompositionSample, Variable};

/// Which side of the training range a value fell on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Below,
    Above,
}

/// A variable outside the training-data coverage (extrapolation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeWarning {
    pub variable: Variable,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub bound: Bound,
}

impl RangeWarning {
    /// The bound that was violated
    pub fn violated_limit(&self) -> f64 {
        match self.bound {
            Bound::Below => self.min,
            Bound::Above => self.max,
        }
    }

    pub fn message(&self) -> String {
        let side = match self.bound {
            Bound::Below => "below the training minimum",
            Bound::Above => "above the training maximum",
        };
        format!(
            "{} = {:.2} is {} {:.2} (range {:.2} - {:.2})",
            self.variable,
            self.value,
            side,
            self.violated_limit(),
            self.min,
            self.max
        )
    }
}

/// Composition total deviates from 100 beyond tolerance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SumAdvisory {
    pub sum: f64,
    /// Signed: `sum - 100`
    pub deviation: f64,
    pub tolerance: f64,
}

impl SumAdvisory {
    pub fn message(&self) -> String {
        format!(
            "Component sum is {:.1}% ({:+.1}%), expected 100 ± {}%; extrapolation uncertainty is higher",
            self.sum, self.deviation, self.tolerance
        )
    }
}

/// Raw prediction lies close to a category boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalZone {
    pub boundary: f64,
    pub distance: f64,
}

impl CriticalZone {
    pub fn message(&self) -> String {
        format!(
            "Prediction is within {:.2} RON of the {} boundary; classification is sensitive to model error",
            self.distance, self.boundary
        )
    }
}

/// Fixed-width interval around the predicted value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub low: f64,
    pub high: f64,
    pub margin: f64,
}

impl ConfidenceBand {
    pub fn around(value: f64, margin: f64) -> Self {
        Self {
            low: value - margin,
            high: value + margin,
            margin,
        }
    }
}

/// Complete, immutable outcome of one prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub id: Uuid,
    pub timestamp: DateTime<Local>,
    pub inputs: CompositionSample,
    pub ox: f64,
    pub component_sum: f64,
    pub predicted_value: f64,
    pub rounded_value: i64,
    pub confidence_band: ConfidenceBand,
    pub classification: FiscalClassification,
    pub critical_zone: Option<CriticalZone>,
    pub out_of_range: Vec<RangeWarning>,
    pub sum_advisory: Option<SumAdvisory>,
}

impl PredictionResult {
    /// True when no variable required extrapolation
    pub fn within_training_range(&self) -> bool {
        self.out_of_range.is_empty()
    }

    /// All advisory messages, in display order
    pub fn advisories(&self) -> Vec<String> {
        let mut messages: Vec<String> = self.out_of_range.iter().map(|w| w.message()).collect();
        if let Some(sum) = &self.sum_advisory {
            messages.push(sum.message());
        }
        if let Some(zone) = &self.critical_zone {
            messages.push(zone.message());
        }
        messages
    }
}
