//! Reference tables shown by every front-end

use serde::Serialize;

use super::classify::FiscalCategory;
use super::validation::RangeTable;
use crate::types::Variable;

/// One row of the ranges table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeRow {
    pub variable: Variable,
    pub label: String,
    pub valid_min: Option<f64>,
    pub valid_max: Option<f64>,
    pub typical_min: Option<f64>,
    pub typical_max: Option<f64>,
}

/// One row of the fiscal categories table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: FiscalCategory,
    pub label: &'static str,
    pub span: &'static str,
    pub nc_code: &'static str,
    pub fiscal_heading: &'static str,
    pub description: &'static str,
}

/// Valid (training) and typical ranges, components first then `Ox`
pub fn range_rows(ranges: &RangeTable) -> Vec<RangeRow> {
    let mut variables: Vec<Variable> = crate::types::Component::ALL
        .iter()
        .map(|c| Variable::Component(*c))
        .collect();
    variables.push(Variable::Ox);

    variables
        .into_iter()
        .map(|variable| {
            let valid = ranges.get(variable);
            let (typical_min, typical_max, label) = match variable {
                Variable::Component(c) => {
                    let (lo, hi) = c.typical_range();
                    (Some(lo), Some(hi), c.label().to_string())
                }
                Variable::Ox => (None, None, "Ox (ETANOL + MTBE + ETBE)".to_string()),
            };
            RangeRow {
                variable,
                label,
                valid_min: valid.map(|r| r.min),
                valid_max: valid.map(|r| r.max),
                typical_min,
                typical_max,
            }
        })
        .collect()
}

pub fn category_rows() -> Vec<CategoryRow> {
    FiscalCategory::ALL
        .iter()
        .map(|c| CategoryRow {
            category: *c,
            label: c.label(),
            span: c.span(),
            nc_code: c.nc_code(),
            fiscal_heading: c.fiscal_heading(),
            description: c.description(),
        })
        .collect()
}
