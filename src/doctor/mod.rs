//! Doctor command for system diagnostics
//!
//! Checks that the model artifact loads and predicts, that the
//! configuration is consistent, and that results can be exported.

use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sysinfo::Disks;

use crate::cli::Config;
use crate::client::PredictionClient;
use crate::model::ModelService;
use crate::pipeline::PredictionPipeline;
use crate::types::CompositionSample;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    /// Extra information shown on success
    pub detail: Option<String>,
}

impl HealthCheck {
    fn pass(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: HealthStatus::Pass,
            detail: Some(detail.into()),
        }
    }

    fn warn(name: &str, msg: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: HealthStatus::Warn(msg.into()),
            detail: None,
        }
    }

    fn fail(name: &str, msg: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: HealthStatus::Fail(msg.into()),
            detail: None,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    config: Config,
    server_url: Option<String>,
}

impl Doctor {
    pub fn new(config: Config, server_url: Option<String>) -> Self {
        Self { config, server_url }
    }

    /// Run all health checks
    pub async fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let model_path = self.config.model_path();
        let mut checks = vec![self.check_config(), check_artifact_present(&model_path)];

        match ModelService::load(&model_path) {
            Ok(model) => {
                let info = model.info();
                checks.push(HealthCheck::pass(
                    "Model Artifact",
                    format!("{} ({}, {} variables)", info.name, info.algorithm, info.variables.len()),
                ));
                checks.push(self.check_example_prediction(model));
            }
            Err(e) => {
                checks.push(HealthCheck::fail("Model Artifact", e.to_string()));
                checks.push(HealthCheck::warn(
                    "Example Prediction",
                    "skipped, model not loaded",
                ));
            }
        }

        let export_dir = export_dir(&self.config.export_path());
        checks.push(check_export_writable(&export_dir));
        checks.push(check_disk_space(&export_dir));

        if let Some(url) = &self.server_url {
            checks.push(check_server(url).await);
        }

        checks
    }

    fn check_config(&self) -> HealthCheck {
        match self.config.validate() {
            Ok(()) => HealthCheck::pass("Configuration", "valid"),
            Err(e) => HealthCheck::fail("Configuration", e.to_string()),
        }
    }

    fn check_example_prediction(&self, model: ModelService) -> HealthCheck {
        let pipeline =
            PredictionPipeline::with_policy(model.into(), self.config.pipeline_policy());
        match pipeline.predict_sample(&CompositionSample::example()) {
            Ok(result) => HealthCheck::pass(
                "Example Prediction",
                format!(
                    "{:.2} RON -> {}",
                    result.predicted_value, result.classification.category
                ),
            ),
            Err(e) => HealthCheck::fail("Example Prediction", e.to_string()),
        }
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\n{}\n", "octanebuddy diagnostics".bold());
        println!("{:<22} Status", "Check");
        println!("{}", "=".repeat(60));

        for check in checks {
            let line = match &check.status {
                HealthStatus::Pass => match &check.detail {
                    Some(detail) => format!("{} {}", "PASS".green(), detail.dimmed()),
                    None => "PASS".green().to_string(),
                },
                HealthStatus::Warn(msg) => format!("{} {}", "WARN:".yellow(), msg),
                HealthStatus::Fail(msg) => format!("{} {}", "FAIL:".red(), msg),
            };
            println!("{:<22} {}", check.name, line);
        }

        println!();
    }

    /// Get overall health status
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks
            .iter()
            .any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}

fn check_artifact_present(path: &Path) -> HealthCheck {
    if path.is_file() {
        HealthCheck::pass("Model File", path.display().to_string())
    } else {
        HealthCheck::fail("Model File", format!("{} not found", path.display()))
    }
}

/// Directory the export file lives in
fn export_dir(export_path: &Path) -> PathBuf {
    match export_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn check_export_writable(dir: &Path) -> HealthCheck {
    if !dir.exists() {
        return HealthCheck::warn(
            "Export Location",
            format!("{} does not exist yet; it will be created", dir.display()),
        );
    }

    let marker = dir.join(".octanebuddy_write_test");
    match std::fs::write(&marker, "test") {
        Ok(()) => {
            let _ = std::fs::remove_file(&marker);
            HealthCheck::pass("Export Location", dir.display().to_string())
        }
        Err(e) => HealthCheck::fail(
            "Export Location",
            format!("cannot write to {}: {}", dir.display(), e),
        ),
    }
}

fn check_disk_space(dir: &Path) -> HealthCheck {
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    let disks = Disks::new_with_refreshed_list();

    // Longest matching mount point wins
    let disk = disks
        .iter()
        .filter(|d| dir.starts_with(d.mount_point()))
        .max_by_key(|d| d.mount_point().as_os_str().len());

    match disk {
        Some(disk) => {
            let available_mb = disk.available_space() / (1024 * 1024);
            if available_mb < 10 {
                HealthCheck::fail("Disk Space", format!("only {} MB available", available_mb))
            } else if available_mb < 100 {
                HealthCheck::warn("Disk Space", format!("low disk space ({} MB)", available_mb))
            } else {
                HealthCheck::pass("Disk Space", format!("{} MB available", available_mb))
            }
        }
        None => HealthCheck::warn("Disk Space", "could not determine disk space"),
    }
}

async fn check_server(url: &str) -> HealthCheck {
    let client = match PredictionClient::new(url, Duration::from_secs(5)) {
        Ok(client) => client,
        Err(e) => return HealthCheck::fail("Server", e.to_string()),
    };
    match client.health().await {
        Ok(health) => HealthCheck::pass(
            "Server",
            format!("{} serving {}", url, health.model),
        ),
        Err(e) => HealthCheck::fail("Server", format!("{} unreachable: {}", url, e)),
    }
}
