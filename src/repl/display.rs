//! Display manager for REPL terminal UI
//!
//! Formats predictions, reference tables, and batch progress.

use colored::*;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;

use super::commands::{MENU, SLASH_COMMANDS};
use super::session::SessionManager;
use crate::export::BatchSummary;
use crate::model::ModelInfo;
use crate::pipeline::{CategoryRow, FiscalCategory, Preview, RangeRow};
use crate::telemetry::TelemetryStats;
use crate::types::PredictionResult;

const WIDTH: usize = 64;

/// Display manager for REPL UI
pub struct DisplayManager {
    /// Show parameters and metadata in `show_info`
    details: bool,
}

impl DisplayManager {
    pub fn new() -> Self {
        DisplayManager { details: false }
    }

    pub fn with_details(details: bool) -> Self {
        DisplayManager { details }
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: &str) {
        let title = format!("  octanebuddy {} - RON Prediction & Fiscal Classification", version);
        let info = format!("  Model: {} | Mode: REPL", model);

        println!("\n{}", "=".repeat(WIDTH).cyan());
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", "=".repeat(WIDTH).cyan());
    }

    pub fn show_menu(&self) {
        self.show_section("Main menu");
        for (key, label) in MENU.iter() {
            println!("  {}. {}", key.cyan(), label);
        }
        println!(
            "\n  Type a number, or {} for all commands\n",
            "/help".green()
        );
    }

    pub fn show_help(&self) {
        self.show_section("Commands");
        for (cmd, desc) in SLASH_COMMANDS.iter() {
            println!("  {:<20} {}", cmd.green(), desc);
        }
        println!();
    }

    /// Ox and total shown before confirming a sample
    pub fn show_preview(&self, preview: &Preview) {
        self.show_section("Sample summary");
        println!("  Ox (ETANOL + MTBE + ETBE): {:.2}%", preview.ox);
        let total = format!("{:.2}%", preview.component_sum);
        if preview.sum_advisory.is_some() {
            println!("  Component total:           {}", total.yellow());
        } else {
            println!("  Component total:           {}", total.green());
        }
        if let Some(advisory) = &preview.sum_advisory {
            self.show_warning(&advisory.message());
        }
        for warning in &preview.out_of_range {
            self.show_warning(&warning.message());
        }
    }

    /// Display a prediction with its classification and advisories
    pub fn show_result(&self, result: &PredictionResult) {
        let class = &result.classification;
        let band = &result.confidence_band;

        println!("\n{}", "=".repeat(WIDTH).cyan());
        println!(
            "  {} {:.2} RON (rounded {})",
            "Predicted octane:".bold(),
            result.predicted_value,
            result.rounded_value
        );
        println!(
            "  Confidence interval: {:.2} - {:.2} (±{:.2})",
            band.low, band.high, band.margin
        );
        println!("  Ox: {:.2}% | Total: {:.2}%", result.ox, result.component_sum);
        println!("{}", "-".repeat(WIDTH).cyan());
        println!("  {} {}", "Category:".bold(), category_colored(class.category));
        println!("  {}", class.label);
        println!("  NC code: {} | {}", class.nc_code.bold(), class.fiscal_heading);
        println!("  {}", class.description.dimmed());

        let advisories = result.advisories();
        if advisories.is_empty() {
            println!("\n  {} All variables within training range", "✓".green());
        } else {
            println!();
            for message in advisories {
                self.show_warning(&message);
            }
        }
        println!("{}\n", "=".repeat(WIDTH).cyan());
    }

    pub fn show_ranges(&self, rows: &[RangeRow]) {
        self.show_section("Variable ranges (% vol)");
        println!(
            "  {:<28} {:>16} {:>16}",
            "Variable".bold(),
            "Valid".bold(),
            "Typical".bold()
        );
        for row in rows {
            println!(
                "  {:<28} {:>16} {:>16}",
                row.label,
                span(row.valid_min, row.valid_max),
                span(row.typical_min, row.typical_max)
            );
        }
        println!(
            "\n  {}\n",
            "Values outside the valid range are extrapolations.".dimmed()
        );
    }

    pub fn show_categories(&self, rows: &[CategoryRow]) {
        self.show_section("Fiscal categories");
        for row in rows {
            println!(
                "  {} {} {}",
                category_colored(row.category),
                row.span.bold(),
                format!("NC {}", row.nc_code).dimmed()
            );
            println!("    {}", row.label);
            println!("    {}", row.fiscal_heading.dimmed());
        }
        println!();
    }

    pub fn show_info(&self, info: &ModelInfo) {
        self.show_section("Model");
        println!("  Name:      {}", info.name.bold());
        println!("  Algorithm: {}", info.algorithm);
        println!("  Variables: {}", info.variables.join(", "));
        if let Some(source) = &info.source {
            println!("  Source:    {}", source.display());
        }
        if self.details {
            for (key, value) in &info.parameters {
                println!("  {:<10} {}", format!("{}:", key), value);
            }
            for (key, value) in &info.metadata {
                println!("  {:<10} {}", format!("{}:", key).dimmed(), value);
            }
        }
        println!();
    }

    pub fn show_history(&self, results: &[&PredictionResult]) {
        self.show_section("Prediction history");
        if results.is_empty() {
            println!("  No predictions yet\n");
            return;
        }
        for (i, result) in results.iter().enumerate() {
            println!(
                "  {}. {} {:>7.2} RON  {}",
                (i + 1).to_string().cyan(),
                result.timestamp.format("%H:%M:%S").to_string().dimmed(),
                result.predicted_value,
                category_colored(result.classification.category)
            );
        }
        println!();
    }

    pub fn show_status(&self, session: &SessionManager, stats: &TelemetryStats) {
        self.show_section("Session status");
        println!("  Predictions:  {}", session.prediction_count());
        println!("  Saved to CSV: {}", session.saved_count());
        println!("  Rejected:     {}", stats.rejected);
        println!("  Extrapolated: {}", stats.extrapolated);
        for (category, count) in &stats.by_category {
            println!("    {:<10} {}", category, count);
        }
        if stats.predictions > 0 {
            println!("  Mean latency: {:.2} ms", stats.mean_latency_ms);
        }
        println!("  Duration:     {}s\n", session.session_duration());
    }

    pub fn show_batch_summary(&self, summary: &BatchSummary) {
        self.show_section("Batch summary");
        println!("  Input:     {}", summary.input.display());
        println!("  Output:    {}", summary.output.display());
        println!(
            "  Rows:      {} ({} ok, {} failed)",
            summary.total,
            summary.succeeded.to_string().green(),
            if summary.failed() > 0 {
                summary.failed().to_string().red()
            } else {
                summary.failed().to_string().normal()
            }
        );
        for (category, count) in &summary.categories {
            println!("    {:<10} {}", category, count);
        }
        for failure in summary.failures.iter().take(10) {
            println!("  {} row {}: {}", "✗".red(), failure.row, failure.error);
        }
        if summary.failed() > 10 {
            println!("  ... and {} more", summary.failed() - 10);
        }
        println!();
    }

    /// Progress bar for batch predictions
    pub fn batch_bar(&self, len: usize) -> ProgressBar {
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} Predicting [{bar:40.cyan/blue}] {pos}/{len} | ETA: {eta}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb
    }

    /// Display error message
    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Display warning message
    pub fn show_warning(&self, warning: &str) {
        println!("  {} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    /// Display info message
    pub fn show_info_message(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    pub fn show_success(&self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0))
    }

    /// Show section header
    pub fn show_section(&self, title: &str) {
        println!("\n{}", title.bold().cyan());
        println!("{}", "-".repeat(WIDTH).cyan());
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

fn category_colored(category: FiscalCategory) -> ColoredString {
    match category {
        FiscalCategory::Regular => category.as_str().blue().bold(),
        FiscalCategory::Premium => category.as_str().green().bold(),
        FiscalCategory::Super => category.as_str().magenta().bold(),
    }
}

fn span(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!("{:.2} - {:.2}", lo, hi),
        _ => "-".to_string(),
    }
}
