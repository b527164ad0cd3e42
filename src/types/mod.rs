//! Type definitions module
//!
//! Composition samples, model variables, and prediction results.

pub mod sample;
pub use sample::{Component, CompositionSample, Variable, NOMINAL_TOTAL, OX_NAME};

pub mod result;
pub use result::{Bound, ConfidenceBand, CriticalZone, PredictionResult, RangeWarning, SumAdvisory};
