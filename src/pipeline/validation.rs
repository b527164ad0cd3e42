//! Input validation and advisory checks
//!
//! Missing or non-numeric inputs are errors. Out-of-range values and a
//! component sum far from 100 are collected as advisories only.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::{PredictorError, Result};
use crate::types::{
    Bound, Component, CompositionSample, RangeWarning, SumAdvisory, Variable, NOMINAL_TOTAL,
};

/// Unvalidated name → value mapping, as received from any front-end
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInputs(BTreeMap<String, Value>);

impl RawInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a component, tolerating aliases such as `NAFTÉNICOS`.
    ///
    /// Two keys naming the same component is an error.
    pub fn lookup(&self, component: Component) -> Result<Option<&Value>> {
        let mut matches = self
            .0
            .iter()
            .filter(|(key, _)| Component::from_name(key) == Some(component));

        let Some((_, value)) = matches.next() else {
            return Ok(None);
        };
        if matches.next().is_some() {
            return Err(PredictorError::DuplicateVariable {
                name: component.name().to_string(),
                keys: self
                    .0
                    .keys()
                    .filter(|key| Component::from_name(key) == Some(component))
                    .cloned()
                    .collect(),
            });
        }
        Ok(Some(value))
    }
}

impl From<&CompositionSample> for RawInputs {
    fn from(sample: &CompositionSample) -> Self {
        let mut raw = RawInputs::new();
        for (component, value) in sample.iter() {
            raw.insert(component.name(), value);
        }
        raw
    }
}

impl FromIterator<(String, Value)> for RawInputs {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        RawInputs(iter.into_iter().collect())
    }
}

/// Training-data coverage of one variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
}

impl ValidRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn check(&self, variable: Variable, value: f64) -> Option<RangeWarning> {
        let bound = if value < self.min {
            Bound::Below
        } else if value > self.max {
            Bound::Above
        } else {
            return None;
        };

        Some(RangeWarning {
            variable,
            value,
            min: self.min,
            max: self.max,
            bound,
        })
    }
}

/// Valid ranges keyed by variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeTable(BTreeMap<Variable, ValidRange>);

impl Default for RangeTable {
    fn default() -> Self {
        let entries = [
            (Variable::Component(Component::Parafinas), ValidRange::new(5.52, 16.21)),
            (Variable::Component(Component::Isoparafinas), ValidRange::new(25.77, 43.96)),
            (Variable::Component(Component::Naftenicos), ValidRange::new(3.77, 12.00)),
            (Variable::Component(Component::Aromaticos), ValidRange::new(23.44, 37.10)),
            (Variable::Ox, ValidRange::new(3.38, 16.22)),
            (Variable::Component(Component::Etanol), ValidRange::new(0.00, 4.89)),
            (Variable::Component(Component::Mtbe), ValidRange::new(0.00, 13.19)),
            (Variable::Component(Component::Etbe), ValidRange::new(0.00, 14.02)),
        ];
        RangeTable(entries.into_iter().collect())
    }
}

impl RangeTable {
    pub fn empty() -> Self {
        RangeTable(BTreeMap::new())
    }

    pub fn get(&self, variable: Variable) -> Option<&ValidRange> {
        self.0.get(&variable)
    }

    /// Insert or replace a range
    pub fn set(&mut self, variable: Variable, range: ValidRange) {
        self.0.insert(variable, range);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &ValidRange)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// One warning per ranged variable that falls outside its range
    pub fn check(&self, sample: &CompositionSample) -> Vec<RangeWarning> {
        self.0
            .iter()
            .filter_map(|(variable, range)| range.check(*variable, sample.value(*variable)))
            .collect()
    }
}

/// Sample that passed validation, with its range warnings
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSample {
    pub sample: CompositionSample,
    pub warnings: Vec<RangeWarning>,
}

/// Parse one input value as a finite f64
pub fn parse_number(name: &str, value: &Value) -> Result<f64> {
    let invalid = || PredictorError::InvalidNumber {
        name: name.to_string(),
        value: match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    };

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(invalid()),
    }
}

/// Validate raw inputs into a sample.
///
/// Variables are checked in canonical order, so the first missing one is
/// the one reported. Any caller-supplied `Ox` is ignored.
pub fn validate(raw: &RawInputs, ranges: &RangeTable) -> Result<ValidatedSample> {
    let mut sample = CompositionSample::default();

    for component in Component::ALL {
        let value = raw
            .lookup(component)?
            .ok_or_else(|| PredictorError::MissingVariable {
                name: component.name().to_string(),
            })?;
        sample.set(component, parse_number(component.name(), value)?);
    }

    let warnings = ranges.check(&sample);
    Ok(ValidatedSample { sample, warnings })
}

/// Advisory when `|sum - 100| > tolerance`
pub fn sum_check(sample: &CompositionSample, tolerance: f64) -> Option<SumAdvisory> {
    let sum = sample.component_sum();
    let deviation = sum - NOMINAL_TOTAL;
    if deviation.abs() > tolerance {
        Some(SumAdvisory {
            sum,
            deviation,
            tolerance,
        })
    } else {
        None
    }
}
