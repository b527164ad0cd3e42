//! Gradient-boosted regression trees
//!
//! Prediction is `base_score + learning_rate * Σ tree(x)`. Nodes are stored
//! in pre-order; a split sends `x[feature] <= threshold` to the left child.

use serde::{Deserialize, Serialize};

use super::Regressor;
use crate::errors::{PredictorError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        leaf: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Children must point forward, which rules out cycles
    fn validate(&self, index: usize, n_features: usize) -> Result<()> {
        let invalid = |msg: String| {
            Err(PredictorError::ModelUnavailable(format!("tree {}: {}", index, msg)))
        };

        if self.nodes.is_empty() {
            return invalid("has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return invalid(format!(
                            "node {} uses feature {} but the model has {} features",
                            i, feature, n_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return invalid(format!("node {} has a non-finite threshold", i));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return invalid(format!("node {} has invalid child {}", i, child));
                        }
                    }
                }
                TreeNode::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return invalid(format!("node {} has a non-finite leaf value", i));
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, row: &[f64]) -> Result<f64> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { leaf }) => return Ok(*leaf),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).ok_or_else(|| {
                        PredictorError::PredictionError(format!(
                            "feature {} missing from row of length {}",
                            feature,
                            row.len()
                        ))
                    })?;
                    index = if *x <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(PredictorError::PredictionError(format!(
                        "dangling node index {}",
                        index
                    )))
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingModel {
    pub base_score: f64,
    pub learning_rate: f64,
    pub trees: Vec<Tree>,
}

impl Regressor for GradientBoostingModel {
    fn predict(&self, row: &[f64]) -> Result<f64> {
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(row)?;
        }
        Ok(self.base_score + self.learning_rate * total)
    }

    fn algorithm(&self) -> &'static str {
        "Gradient Boosting Regressor"
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        if !self.base_score.is_finite() || !self.learning_rate.is_finite() {
            return Err(PredictorError::ModelUnavailable(
                "base_score and learning_rate must be finite".to_string(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, n_features)?;
        }
        Ok(())
    }

    fn describe(&self) -> Vec<(String, String)> {
        vec![
            ("n_estimators".to_string(), self.trees.len().to_string()),
            ("learning_rate".to_string(), self.learning_rate.to_string()),
            ("base_score".to_string(), self.base_score.to_string()),
        ]
    }
}
