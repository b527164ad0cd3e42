//! Feature layout: the ordered variable list a model was trained on
//!
//! The regressor has no field-name awareness at call time, so the row
//! must be built in exactly this order.

use crate::errors::{PredictorError, Result};
use crate::types::{CompositionSample, Variable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    variables: Vec<Variable>,
}

impl FeatureLayout {
    /// Resolve declared names; unknown or duplicated names are rejected
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        if names.is_empty() {
            return Err(PredictorError::ModelUnavailable(
                "model declares no variables".to_string(),
            ));
        }

        let mut variables = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let variable = Variable::from_name(name).ok_or_else(|| {
                PredictorError::ModelUnavailable(format!("model expects unknown variable '{}'", name))
            })?;
            if variables.contains(&variable) {
                return Err(PredictorError::ModelUnavailable(format!(
                    "model declares variable '{}' twice",
                    name
                )));
            }
            variables.push(variable);
        }

        Ok(Self { variables })
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Feature row for a sample, in declared order
    pub fn row(&self, sample: &CompositionSample) -> Vec<f64> {
        self.variables.iter().map(|v| sample.value(*v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Component;

    #[test]
    fn test_row_follows_declared_order() {
        let layout = FeatureLayout::from_names(&["Ox", "MTBE", "PARAFINAS"]).unwrap();
        let sample = CompositionSample::example().with(Component::Mtbe, 2.0);
        assert_eq!(layout.row(&sample), vec![6.8, 2.0, 10.5]);
    }

    #[test]
    fn test_accented_names_resolve() {
        let layout = FeatureLayout::from_names(&["NAFTÉNICOS", "AROMÁTICOS"]).unwrap();
        assert_eq!(
            layout.variables(),
            &[
                Variable::Component(Component::Naftenicos),
                Variable::Component(Component::Aromaticos)
            ]
        );
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let err = FeatureLayout::from_names(&["PARAFINAS", "BENCENO"]).unwrap_err();
        assert!(matches!(err, PredictorError::ModelUnavailable(_)));
        assert!(err.to_string().contains("BENCENO"));
    }

    #[test]
    fn test_duplicate_and_empty_rejected() {
        assert!(FeatureLayout::from_names(&["MTBE", "mtbe"]).is_err());
        assert!(FeatureLayout::from_names::<&str>(&[]).is_err());
    }
}
