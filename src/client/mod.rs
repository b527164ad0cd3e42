//! HTTP client for a running octanebuddy server
//!
//! Used by `predict --server` and by `doctor` to check reachability.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::errors::{PredictorError, Result};
use crate::pipeline::RawInputs;
use crate::server::handlers::{ErrorBody, HealthResponse};
use crate::types::PredictionResult;

/// Client for the prediction API
pub struct PredictionClient {
    client: Client,
    base_url: String,
}

impl PredictionClient {
    /// Create a client for `base_url` (e.g. http://127.0.0.1:5000)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /predict
    pub async fn predict(&self, raw: &RawInputs) -> Result<PredictionResult> {
        let url = format!("{}/predict", self.base_url);
        debug!(url = %url, variables = raw.len(), "remote prediction");

        let response = self.client.post(&url).json(raw).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body: Option<ErrorBody> = response.json().await.ok();
        Err(remote_error(status, body))
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(PredictorError::PredictionError(format!(
                "server health check failed: {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }
}

/// Map an API error body back onto the local error type
fn remote_error(status: StatusCode, body: Option<ErrorBody>) -> PredictorError {
    let Some(body) = body else {
        return PredictorError::PredictionError(format!("server returned {}", status));
    };

    match (body.kind.as_str(), body.variable) {
        ("missing_variable", Some(name)) => PredictorError::MissingVariable { name },
        ("invalid_number", Some(name)) => PredictorError::InvalidNumber {
            name,
            value: body.value.unwrap_or_default(),
        },
        ("duplicate_variable", Some(name)) => PredictorError::DuplicateVariable {
            name,
            keys: body
                .value
                .map(|keys| keys.split(", ").map(str::to_string).collect())
                .unwrap_or_default(),
        },
        ("model_unavailable", _) => PredictorError::ModelUnavailable(body.error),
        _ => PredictorError::PredictionError(format!("server returned {}: {}", status, body.error)),
    }
}
