//! Configuration management for octanebuddy
//!
//! TOML-based configuration with defaults and validation.
//! Location: ~/.octanebuddy/config.toml

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::{PredictorError, Result};
use crate::export::DEFAULT_EXPORT_FILE;
use crate::pipeline::{
    ClassificationBasis, ClassificationPolicy, PipelinePolicy, RangeTable, ValidRange,
    CONFIDENCE_MARGIN, CRITICAL_MARGIN, PREMIUM_MAX, REGULAR_MAX, SUM_TOLERANCE,
};
use crate::types::Variable;

/// Complete configuration for octanebuddy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub server: ServerConfig,
    pub policy: PolicyConfig,
    /// Per-variable overrides of the training ranges
    pub ranges: BTreeMap<String, ValidRange>,
    pub export: ExportConfig,
    pub telemetry: TelemetryConfig,
}

/// Model artifact location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: String,
}

/// REST server binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Classification and advisory thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub basis: ClassificationBasis,
    pub confidence_margin: f64,
    pub regular_max: f64,
    pub premium_max: f64,
    pub critical_margin: f64,
    pub sum_tolerance: f64,
}

/// CSV export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub file: String,
}

/// Logging and terminal display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub color_output: bool,
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "models/octane_gb.json".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            basis: ClassificationBasis::Raw,
            confidence_margin: CONFIDENCE_MARGIN,
            regular_max: REGULAR_MAX,
            premium_max: PREMIUM_MAX,
            critical_margin: CRITICAL_MARGIN,
            sum_tolerance: SUM_TOLERANCE,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file: DEFAULT_EXPORT_FILE.to_string(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            color_output: true,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PredictorError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| PredictorError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Standard location or built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".octanebuddy").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let p = &self.policy;

        if p.regular_max >= p.premium_max {
            return Err(PredictorError::ConfigError(
                "regular_max must be less than premium_max".to_string(),
            ));
        }

        for (name, value) in [
            ("confidence_margin", p.confidence_margin),
            ("critical_margin", p.critical_margin),
            ("sum_tolerance", p.sum_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PredictorError::ConfigError(format!(
                    "{} must be a non-negative number",
                    name
                )));
            }
        }

        for (name, range) in &self.ranges {
            if Variable::from_name(name).is_none() {
                return Err(PredictorError::ConfigError(format!(
                    "Unknown variable in [ranges]: {}",
                    name
                )));
            }
            if range.min > range.max {
                return Err(PredictorError::ConfigError(format!(
                    "Range for {} has min > max",
                    name
                )));
            }
        }

        if self.server.port == 0 {
            return Err(PredictorError::ConfigError(
                "server port must be greater than 0".to_string(),
            ));
        }

        if self.export.file.trim().is_empty() {
            return Err(PredictorError::ConfigError(
                "export file must not be empty".to_string(),
            ));
        }

        match self.telemetry.log_level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            other => {
                return Err(PredictorError::ConfigError(format!(
                    "Invalid log level: {}",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| PredictorError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PredictorError::ConfigError(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PredictorError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Pipeline policy with range overrides applied
    pub fn pipeline_policy(&self) -> PipelinePolicy {
        let p = &self.policy;
        let mut ranges = RangeTable::default();
        for (name, range) in &self.ranges {
            if let Some(variable) = Variable::from_name(name) {
                ranges.set(variable, *range);
            }
        }

        PipelinePolicy {
            classification: ClassificationPolicy {
                basis: p.basis,
                regular_max: p.regular_max,
                premium_max: p.premium_max,
                critical_margin: p.critical_margin,
            },
            confidence_margin: p.confidence_margin,
            sum_tolerance: p.sum_tolerance,
            ranges,
        }
    }

    /// Server base URL
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn model_path(&self) -> PathBuf {
        Self::expand_path(&self.model.path)
    }

    pub fn export_path(&self) -> PathBuf {
        Self::expand_path(&self.export.file)
    }
}
