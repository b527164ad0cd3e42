//! Fiscal classification of a predicted octane number
//!
//! Three terminal categories chosen purely from the value:
//! `v < 95` REGULAR, `95 <= v <= 98` PREMIUM, `v > 98` SUPER.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::CriticalZone;

/// Upper bound (exclusive) of the REGULAR category
pub const REGULAR_MAX: f64 = 95.0;

/// Upper bound (inclusive) of the PREMIUM category
pub const PREMIUM_MAX: f64 = 98.0;

/// Half-width of the advisory zone around each boundary
pub const CRITICAL_MARGIN: f64 = 0.5;

/// Allowed deviation of the component sum from 100
pub const SUM_TOLERANCE: f64 = 5.0;

/// Default half-width of the confidence band, in RON
pub const CONFIDENCE_MARGIN: f64 = 0.5;

/// Fiscal category of a gasoline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FiscalCategory {
    Regular,
    Premium,
    Super,
}

impl FiscalCategory {
    pub const ALL: [FiscalCategory; 3] = [
        FiscalCategory::Regular,
        FiscalCategory::Premium,
        FiscalCategory::Super,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FiscalCategory::Regular => "REGULAR",
            FiscalCategory::Premium => "PREMIUM",
            FiscalCategory::Super => "SUPER",
        }
    }

    /// Customs nomenclature (NC) code
    pub fn nc_code(&self) -> &'static str {
        match self {
            FiscalCategory::Regular => "2710.12.41",
            FiscalCategory::Premium => "2710.12.45",
            FiscalCategory::Super => "2710.12.49",
        }
    }

    /// Excise tax heading
    pub fn fiscal_heading(&self) -> &'static str {
        match self {
            FiscalCategory::Regular | FiscalCategory::Premium => "1.2.2",
            FiscalCategory::Super => "1.2.1",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FiscalCategory::Regular => "GASOLINA REGULAR",
            FiscalCategory::Premium => "GASOLINA PREMIUM",
            FiscalCategory::Super => "GASOLINA SUPER",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FiscalCategory::Regular => "Below 95 octane",
            FiscalCategory::Premium => "95 to 98 octane",
            FiscalCategory::Super => "Above 98 octane",
        }
    }

    /// Octane span shown in category tables
    pub fn span(&self) -> &'static str {
        match self {
            FiscalCategory::Regular => "< 95",
            FiscalCategory::Premium => "95 - 98",
            FiscalCategory::Super => "> 98",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        FiscalCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == upper || c.label() == upper)
    }

    pub fn classification(&self) -> FiscalClassification {
        FiscalClassification {
            category: *self,
            label: self.label().to_string(),
            nc_code: self.nc_code().to_string(),
            fiscal_heading: self.fiscal_heading().to_string(),
            description: self.description().to_string(),
        }
    }
}

impl fmt::Display for FiscalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category together with its regulatory codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalClassification {
    pub category: FiscalCategory,
    pub label: String,
    pub nc_code: String,
    pub fiscal_heading: String,
    pub description: String,
}

/// Which value the category decision is taken on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationBasis {
    /// Unrounded model output
    #[default]
    Raw,
    /// Output rounded to the nearest integer
    Rounded,
}

/// Thresholds used by [`classify`] and [`critical_zone`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationPolicy {
    pub basis: ClassificationBasis,
    pub regular_max: f64,
    pub premium_max: f64,
    pub critical_margin: f64,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            basis: ClassificationBasis::Raw,
            regular_max: REGULAR_MAX,
            premium_max: PREMIUM_MAX,
            critical_margin: CRITICAL_MARGIN,
        }
    }
}

/// Nearest integer, ties to even (94.5 -> 94, 95.5 -> 96)
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

impl ClassificationPolicy {
    /// Value the decision applies to, according to the basis
    pub fn decision_value(&self, predicted: f64) -> f64 {
        match self.basis {
            ClassificationBasis::Raw => predicted,
            ClassificationBasis::Rounded => round_half_even(predicted),
        }
    }

    /// Category for an already-selected decision value
    pub fn category_of(&self, value: f64) -> FiscalCategory {
        if value < self.regular_max {
            FiscalCategory::Regular
        } else if value <= self.premium_max {
            FiscalCategory::Premium
        } else {
            FiscalCategory::Super
        }
    }
}

/// Classify a predicted value under the given policy
pub fn classify(predicted: f64, policy: &ClassificationPolicy) -> FiscalClassification {
    policy
        .category_of(policy.decision_value(predicted))
        .classification()
}

/// Advisory flag when the raw prediction is near a boundary.
///
/// Always evaluated on the unrounded value, inclusive at both ends.
pub fn critical_zone(predicted: f64, policy: &ClassificationPolicy) -> Option<CriticalZone> {
    [policy.regular_max, policy.premium_max]
        .into_iter()
        .map(|boundary| CriticalZone {
            boundary,
            distance: (predicted - boundary).abs(),
        })
        .filter(|zone| zone.distance <= policy.critical_margin)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}
