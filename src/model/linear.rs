//! Linear regression: `intercept + Σ coefficient_i * x_i`

use serde::{Deserialize, Serialize};

use super::Regressor;
use crate::errors::{PredictorError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl Regressor for LinearModel {
    fn predict(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            return Err(PredictorError::PredictionError(format!(
                "expected {} features, got {}",
                self.coefficients.len(),
                row.len()
            )));
        }
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }

    fn algorithm(&self) -> &'static str {
        "Linear Regression"
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        if self.coefficients.len() != n_features {
            return Err(PredictorError::ModelUnavailable(format!(
                "linear model has {} coefficients for {} variables",
                self.coefficients.len(),
                n_features
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(PredictorError::ModelUnavailable(
                "linear model has non-finite parameters".to_string(),
            ));
        }
        Ok(())
    }
}
