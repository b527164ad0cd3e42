//! REPL (Read-Eval-Print Loop) module for interactive predictions
//!
//! Numbered menu plus slash commands. Every prediction goes through the
//! shared [`PredictionPipeline`]; results can be appended to the export CSV.

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::export::{self, output_path_for, run_batch};
use crate::pipeline::validation::parse_number;
use crate::pipeline::{category_rows, range_rows, PredictionPipeline};
use crate::repl::commands::Command;
use crate::telemetry::TelemetryCollector;
use crate::types::{Component, CompositionSample, PredictionResult};

pub use crate::repl::display::DisplayManager;
pub use crate::repl::input::{InputHandler, LineSource, ScriptedInput};
pub use crate::repl::session::SessionManager;

const PROMPT: &str = "octanebuddy> ";

/// Default number of entries shown by `/history`
const DEFAULT_HISTORY_LIMIT: usize = 10;

/// REPL session coordinator
pub struct ReplSession<I: LineSource> {
    input: I,
    pipeline: Arc<PredictionPipeline>,
    telemetry: TelemetryCollector,
    session: SessionManager,
    display: DisplayManager,
    export_path: PathBuf,
}

impl<I: LineSource> ReplSession<I> {
    pub fn new(
        input: I,
        pipeline: Arc<PredictionPipeline>,
        telemetry: TelemetryCollector,
        export_path: PathBuf,
    ) -> Self {
        ReplSession {
            input,
            pipeline,
            telemetry,
            session: SessionManager::new(),
            display: DisplayManager::new(),
            export_path,
        }
    }

    pub fn with_display(mut self, display: DisplayManager) -> Self {
        self.display = display;
        self
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.telemetry
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn show_welcome(&self, version: &str) {
        self.display
            .show_banner(version, &self.pipeline.model().info().name);
        self.display.show_menu();
    }

    /// Main loop; returns on exit command or EOF
    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(line) = self.input.read_line(PROMPT)? else {
                break;
            };
            if !self.handle_input(&line)? {
                break;
            }
        }

        if let Err(e) = self.input.save() {
            warn!(error = %e, "could not save input history");
        }
        println!("Goodbye!");
        Ok(())
    }

    /// Handle one menu line. Returns false to exit.
    pub fn handle_input(&mut self, line: &str) -> Result<bool> {
        if line.trim().is_empty() {
            return Ok(true);
        }

        match commands::parse(line) {
            Command::Predict => {
                if let Some(sample) = self.collect_sample()? {
                    self.confirm_and_predict(sample)?;
                }
            }
            Command::Example => {
                let sample = CompositionSample::example();
                for (component, value) in sample.iter() {
                    println!("  {:<12} {:>6.2}%", component.name(), value);
                }
                self.confirm_and_predict(sample)?;
            }
            Command::Batch { path } => self.batch(path)?,
            Command::Info => self.display.show_info(self.pipeline.model().info()),
            Command::Ranges => self
                .display
                .show_ranges(&range_rows(&self.pipeline.policy().ranges)),
            Command::Categories => self.display.show_categories(&category_rows()),
            Command::History { limit } => {
                let history = self
                    .session
                    .get_history(limit.unwrap_or(DEFAULT_HISTORY_LIMIT));
                self.display.show_history(&history);
            }
            Command::Status => self
                .display
                .show_status(&self.session, &self.telemetry.get_stats()),
            Command::Help => self.display.show_help(),
            Command::Clear => {
                self.display.clear_screen()?;
                self.display.show_menu();
            }
            Command::Exit => return Ok(false),
            Command::Unknown { input } => {
                self.display
                    .show_error(&format!("Unknown option: {}", input.trim()));
                self.display.show_menu();
            }
        }

        Ok(true)
    }

    /// Prompt for every component; `None` when the user cancels
    pub fn collect_sample(&mut self) -> Result<Option<CompositionSample>> {
        println!("\nEnter each component in % vol (/cancel to abort)");
        let mut sample = CompositionSample::default();

        for component in Component::ALL {
            let (lo, hi) = component.typical_range();
            let prompt = format!("  {} [{:.0}-{:.0}]: ", component.label(), lo, hi);

            let value = loop {
                let Some(line) = self.input.read_line(&prompt)? else {
                    return Ok(None);
                };
                if line.eq_ignore_ascii_case("/cancel") {
                    return Ok(None);
                }
                match parse_number(component.name(), &Value::String(line)) {
                    Ok(v) => break v,
                    Err(e) => self.display.show_error(&format!("{}; try again", e)),
                }
            };
            sample.set(component, value);
        }

        Ok(Some(sample))
    }

    /// Show the preview, ask on sum deviation, then predict
    fn confirm_and_predict(&mut self, sample: CompositionSample) -> Result<()> {
        let preview = self.pipeline.preview(&sample);
        self.display.show_preview(&preview);

        if preview.sum_advisory.is_some() && !self.confirm("Continue anyway? (s/n): ")? {
            self.display.show_info_message("Prediction cancelled");
            return Ok(());
        }

        if let Some(result) = self.predict(&sample) {
            self.display.show_result(&result);
            if self.confirm("Save result to CSV? (s/n): ")? {
                let path = self.ask_file_name()?;
                self.save(&result, &path)?;
            }
            self.session.record(result);
        }
        Ok(())
    }

    fn predict(&mut self, sample: &CompositionSample) -> Option<PredictionResult> {
        let started = Instant::now();
        match self.pipeline.predict_sample(sample) {
            Ok(result) => {
                self.telemetry.served(
                    result.classification.category,
                    result.predicted_value,
                    !result.within_training_range(),
                    started.elapsed(),
                );
                debug!(id = %result.id, predicted = result.predicted_value, "repl prediction");
                Some(result)
            }
            Err(e) => {
                self.telemetry.error(&e);
                self.display.show_error(&e.to_string());
                None
            }
        }
    }

    /// Output file for a save; empty answer or EOF keeps the configured one.
    /// A name without extension gets `.csv`.
    fn ask_file_name(&mut self) -> Result<PathBuf> {
        let prompt = format!("  File name [{}]: ", self.export_path.display());
        let path = match self.input.read_line(&prompt)? {
            Some(name) if !name.is_empty() => PathBuf::from(name),
            _ => return Ok(self.export_path.clone()),
        };
        if path.extension().is_none() {
            return Ok(path.with_extension("csv"));
        }
        Ok(path)
    }

    fn save(&mut self, result: &PredictionResult, path: &Path) -> Result<()> {
        match export::append_result(path, result) {
            Ok(()) => {
                self.telemetry.exported(1);
                self.session.mark_saved();
                self.display.show_success(&format!("Saved to {}", path.display()));
            }
            Err(e) => self.display.show_error(&format!("Could not save: {}", e)),
        }
        Ok(())
    }

    fn batch(&mut self, path: Option<String>) -> Result<()> {
        let path = match path {
            Some(p) => p,
            None => match self.input.read_line("  CSV file: ")? {
                Some(p) if !p.is_empty() => p,
                _ => return Ok(()),
            },
        };
        let input = PathBuf::from(path);
        let output = output_path_for(&input);

        match self.run_batch_with_bar(&input, &output) {
            Ok(summary) => {
                self.telemetry.exported(summary.succeeded);
                self.display.show_batch_summary(&summary);
            }
            Err(e) => self
                .display
                .show_error(&format!("Batch failed for {}: {:#}", input.display(), e)),
        }
        Ok(())
    }

    fn run_batch_with_bar(&self, input: &Path, output: &Path) -> Result<export::BatchSummary> {
        let bar = self.display.batch_bar(0);
        let summary = run_batch(&self.pipeline, input, output, &mut |done, total| {
            bar.set_length(total as u64);
            bar.set_position(done as u64);
        })
        .with_context(|| format!("reading {}", input.display()));
        bar.finish_and_clear();
        summary
    }

    /// Yes/no question; accepts s/si/y/yes and n/no. EOF means no.
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        loop {
            let Some(answer) = self.input.read_line(prompt)? else {
                return Ok(false);
            };
            match answer.to_lowercase().as_str() {
                "s" | "si" | "sí" | "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.display.show_error("Please answer s or n"),
            }
        }
    }
}
