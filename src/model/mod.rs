//! Model service: loads the regression artifact once and evaluates it
//!
//! The artifact is a JSON document naming its variables in training order
//! and carrying one of the supported regressor kinds. Loading is
//! all-or-nothing: any structural problem is `ModelUnavailable`.

pub mod gbdt;
pub mod layout;
pub mod linear;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{PredictorError, Result};
use crate::types::CompositionSample;

pub use gbdt::{GradientBoostingModel, Tree, TreeNode};
pub use layout::FeatureLayout;
pub use linear::LinearModel;

/// A fitted regressor over a positional feature row
pub trait Regressor: Send + Sync {
    fn predict(&self, row: &[f64]) -> Result<f64>;

    /// Human-readable algorithm name
    fn algorithm(&self) -> &'static str;

    /// Structural check against the declared feature count
    fn validate(&self, _n_features: usize) -> Result<()> {
        Ok(())
    }

    /// Hyper-parameters worth showing in `info`
    fn describe(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Regressor that ignores its inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantRegressor {
    pub value: f64,
}

impl ConstantRegressor {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Regressor for ConstantRegressor {
    fn predict(&self, _row: &[f64]) -> Result<f64> {
        Ok(self.value)
    }

    fn algorithm(&self) -> &'static str {
        "Constant"
    }

    fn validate(&self, _n_features: usize) -> Result<()> {
        if self.value.is_finite() {
            Ok(())
        } else {
            Err(PredictorError::ModelUnavailable(
                "constant model value must be finite".to_string(),
            ))
        }
    }
}

/// Regressor payload of an artifact, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    GradientBoosting(GradientBoostingModel),
    Linear(LinearModel),
    Constant(ConstantRegressor),
}

impl ModelSpec {
    fn into_regressor(self) -> Box<dyn Regressor> {
        match self {
            ModelSpec::GradientBoosting(m) => Box::new(m),
            ModelSpec::Linear(m) => Box::new(m),
            ModelSpec::Constant(m) => Box::new(m),
        }
    }
}

/// On-disk model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub variables: Vec<String>,
    pub model: ModelSpec,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl ModelArtifact {
    /// Write the artifact as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Descriptive metadata of the loaded model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub algorithm: String,
    pub variables: Vec<String>,
    pub parameters: BTreeMap<String, String>,
    pub metadata: BTreeMap<String, Value>,
    pub source: Option<PathBuf>,
}

/// Loaded, immutable model shared by all front-ends
pub struct ModelService {
    layout: FeatureLayout,
    regressor: Box<dyn Regressor>,
    info: ModelInfo,
}

impl std::fmt::Debug for ModelService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelService")
            .field("name", &self.info.name)
            .field("algorithm", &self.info.algorithm)
            .field("variables", &self.info.variables)
            .finish()
    }
}

impl ModelService {
    /// Load an artifact from disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            PredictorError::ModelUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&contents).map_err(|e| {
            PredictorError::ModelUnavailable(format!("cannot parse {}: {}", path.display(), e))
        })?;

        let service = Self::build(artifact, Some(path.to_path_buf()))?;
        info!(
            path = %path.display(),
            name = %service.info.name,
            algorithm = %service.info.algorithm,
            variables = service.layout.len(),
            "model loaded"
        );
        Ok(service)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        Self::build(artifact, None)
    }

    /// Wrap an in-process regressor
    pub fn with_regressor(
        name: &str,
        variables: &[&str],
        regressor: Box<dyn Regressor>,
    ) -> Result<Self> {
        let layout = FeatureLayout::from_names(variables)?;
        regressor.validate(layout.len())?;
        let info = ModelInfo {
            name: name.to_string(),
            algorithm: regressor.algorithm().to_string(),
            variables: variables.iter().map(|v| v.to_string()).collect(),
            parameters: regressor.describe().into_iter().collect(),
            metadata: BTreeMap::new(),
            source: None,
        };
        Ok(Self {
            layout,
            regressor,
            info,
        })
    }

    fn build(artifact: ModelArtifact, source: Option<PathBuf>) -> Result<Self> {
        let layout = FeatureLayout::from_names(&artifact.variables)?;
        let regressor = artifact.model.into_regressor();
        regressor.validate(layout.len())?;

        let variables = layout.variables().iter().map(|v| v.name().to_string()).collect();
        let info = ModelInfo {
            name: artifact.name,
            algorithm: regressor.algorithm().to_string(),
            variables,
            parameters: regressor.describe().into_iter().collect(),
            metadata: artifact.metadata,
            source,
        };
        Ok(Self {
            layout,
            regressor,
            info,
        })
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Evaluate the model on a sample.
    ///
    /// A regressor error, a panic, or a non-finite output all surface as
    /// `PredictionError`.
    pub fn predict(&self, sample: &CompositionSample) -> Result<f64> {
        let row = self.layout.row(sample);
        debug!(?row, "evaluating model");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.regressor.predict(&row)));
        let value = match outcome {
            Ok(Ok(value)) => value,
            Ok(Err(PredictorError::PredictionError(msg))) => {
                return Err(PredictorError::PredictionError(msg))
            }
            Ok(Err(other)) => return Err(PredictorError::PredictionError(other.to_string())),
            Err(_) => {
                return Err(PredictorError::PredictionError(
                    "regressor panicked".to_string(),
                ))
            }
        };

        if !value.is_finite() {
            return Err(PredictorError::PredictionError(format!(
                "regressor returned non-finite value {}",
                value
            )));
        }
        Ok(value)
    }
}
