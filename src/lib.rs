//! octanebuddy - gasoline octane (RON) prediction and fiscal classification
//!
//! A pre-trained regression model turns eight chromatographic composition
//! percentages into a research octane number, which is then classified
//! into a fiscal category (REGULAR, PREMIUM, SUPER) with its NC code.
//!
//! # Architecture
//!
//! - **Core**: `types`, `model`, `pipeline` (validation, prediction,
//!   classification) and `export` (CSV results and batch runs)
//! - **Front-ends**: `server` (REST API + dashboard), `repl` (interactive
//!   menu), `cli` (one-shot subcommands) and `client` (remote predictions)
//! - **Operations**: `telemetry`, `doctor`

pub mod errors;
pub mod types;

pub mod export;
pub mod model;
pub mod pipeline;

pub mod cli;
pub mod client;
pub mod repl;
pub mod server;

pub mod doctor;
pub mod telemetry;

// Re-export commonly used types
pub use errors::{PredictorError, Result};
pub use model::{ModelArtifact, ModelService, Regressor};
pub use pipeline::{FiscalCategory, PredictionPipeline, RawInputs};
pub use types::{Component, CompositionSample, PredictionResult, Variable};
