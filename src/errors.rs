//! Error types for octanebuddy
//!
//! Validation failures are recoverable and reported back to the caller;
//! model loading failures are fatal for the process.

use thiserror::Error;

/// Main error type for the prediction pipeline and its adapters
#[derive(Error, Debug)]
pub enum PredictorError {
    /// A required composition variable was not supplied
    #[error("Missing variable: {name}")]
    MissingVariable { name: String },

    /// One component supplied under more than one alias
    #[error("Variable {name} supplied more than once: {}", .keys.join(", "))]
    DuplicateVariable { name: String, keys: Vec<String> },

    /// A supplied value could not be read as a finite number
    #[error("Invalid number for {name}: {value:?}")]
    InvalidNumber { name: String, value: String },

    /// Model artifact missing, unreadable, or structurally invalid
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// The regressor failed while evaluating a feature row
    #[error("Prediction failed: {0}")]
    PredictionError(String),

    /// CSV export/import errors
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PredictorError {
    /// Whether the error was caused by bad caller input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PredictorError::MissingVariable { .. }
                | PredictorError::DuplicateVariable { .. }
                | PredictorError::InvalidNumber { .. }
        )
    }

    /// Stable machine-readable kind, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            PredictorError::MissingVariable { .. } => "missing_variable",
            PredictorError::DuplicateVariable { .. } => "duplicate_variable",
            PredictorError::InvalidNumber { .. } => "invalid_number",
            PredictorError::ModelUnavailable(_) => "model_unavailable",
            PredictorError::PredictionError(_) => "prediction_error",
            PredictorError::Export(_) => "export_error",
            PredictorError::ConfigError(_) => "config_error",
            PredictorError::Http(_) => "http_error",
            PredictorError::Serialization(_) => "serialization_error",
            PredictorError::Io(_) => "io_error",
        }
    }

    /// Variable name involved, if any
    pub fn variable(&self) -> Option<&str> {
        match self {
            PredictorError::MissingVariable { name } => Some(name),
            PredictorError::DuplicateVariable { name, .. } => Some(name),
            PredictorError::InvalidNumber { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl From<csv::Error> for PredictorError {
    fn from(err: csv::Error) -> Self {
        PredictorError::Export(err.to_string())
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PredictorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable_names_field() {
        let err = PredictorError::MissingVariable {
            name: "OLEFINAS".to_string(),
        };
        assert!(err.to_string().contains("OLEFINAS"));
        assert_eq!(err.variable(), Some("OLEFINAS"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_invalid_number_display() {
        let err = PredictorError::InvalidNumber {
            name: "MTBE".to_string(),
            value: "abc".to_string(),
        };
        assert!(err.to_string().contains("MTBE"));
        assert!(err.to_string().contains("abc"));
        assert_eq!(err.kind(), "invalid_number");
    }

    #[test]
    fn test_duplicate_variable_lists_keys() {
        let err = PredictorError::DuplicateVariable {
            name: "NAFTENICOS".to_string(),
            keys: vec!["NAFTENICOS".to_string(), "NAFTÉNICOS".to_string()],
        };
        assert!(err.is_validation());
        assert_eq!(err.kind(), "duplicate_variable");
        assert_eq!(err.variable(), Some("NAFTENICOS"));
        assert!(err.to_string().contains("NAFTENICOS, NAFTÉNICOS"));
    }

    #[test]
    fn test_model_errors_are_not_validation() {
        let err = PredictorError::ModelUnavailable("gone".to_string());
        assert!(!err.is_validation());
        assert!(err.variable().is_none());
        assert_eq!(
            PredictorError::PredictionError("x".into()).kind(),
            "prediction_error"
        );
    }
}
