//! octanebuddy - Main CLI Entry Point

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use octanebuddy::{
    cli::{Args, Commands, Config, Verbosity},
    client::PredictionClient,
    doctor::Doctor,
    export,
    model::ModelService,
    pipeline::{category_rows, range_rows, PredictionPipeline, RawInputs},
    repl::{DisplayManager, InputHandler, ReplSession},
    server::{self, AppState},
    telemetry::{self, TelemetryCollector},
    types::CompositionSample,
    PredictionResult,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    let verbosity = args.verbosity();

    if args.no_color || !config.telemetry.color_output {
        colored::control::set_override(false);
    }
    telemetry::init_logging(
        verbosity.log_level(&config.telemetry.log_level),
        config.telemetry.json_logs,
    )?;

    match args.command() {
        Commands::Start => run_repl(&config, verbosity)?,
        Commands::Serve => run_serve(&config).await?,
        Commands::Predict {
            values,
            example,
            server,
            json,
            save,
        } => {
            let raw = if *example {
                RawInputs::from(&CompositionSample::example())
            } else {
                values
                    .iter()
                    .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
                    .collect()
            };
            run_predict(&config, &raw, server.as_deref(), *json, *save).await?;
        }
        Commands::Batch { input, output } => {
            run_batch(&config, input, output.as_deref(), verbosity)?;
        }
        Commands::Info => {
            let pipeline = load_pipeline(&config)?;
            DisplayManager::with_details(true).show_info(pipeline.model().info());
        }
        Commands::Ranges => {
            DisplayManager::new().show_ranges(&range_rows(&config.pipeline_policy().ranges));
        }
        Commands::Categories => DisplayManager::new().show_categories(&category_rows()),
        Commands::Doctor => run_doctor(&config, args.host.is_some() || args.port.is_some()).await?,
        Commands::Config { write } => show_config(&args, &config, *write)?,
    }

    Ok(())
}

/// Config file with command-line overrides applied
fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::load(args.config.clone()).context("Failed to load configuration")?;

    if let Some(model) = &args.model {
        config.model.path = model.display().to_string();
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_pipeline(config: &Config) -> Result<Arc<PredictionPipeline>> {
    let path = config.model_path();
    let model = ModelService::load(&path)
        .with_context(|| format!("Cannot load model artifact {}", path.display()))?;
    Ok(Arc::new(PredictionPipeline::with_policy(
        Arc::new(model),
        config.pipeline_policy(),
    )))
}

fn run_repl(config: &Config, verbosity: Verbosity) -> Result<()> {
    let pipeline = load_pipeline(config)?;

    let input = match dirs::home_dir() {
        Some(home) => InputHandler::with_history(home.join(".octanebuddy").join("history"))?,
        None => InputHandler::new()?,
    };

    let mut repl = ReplSession::new(
        input,
        pipeline,
        TelemetryCollector::new(),
        config.export_path(),
    )
    .with_display(DisplayManager::with_details(verbosity.show_details()));

    repl.show_welcome(VERSION);
    repl.run()
}

async fn run_serve(config: &Config) -> Result<()> {
    let pipeline = load_pipeline(config)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    println!(
        "{} Serving {} on {}",
        "✓".green(),
        pipeline.model().info().name.bold(),
        format!("http://{}", addr).cyan()
    );
    println!("  Dashboard: {}", format!("http://{}/dashboard", addr).cyan());
    println!("  Press Ctrl-C to stop\n");

    server::run_server(AppState::new(pipeline), addr).await?;
    Ok(())
}

async fn run_predict(
    config: &Config,
    raw: &RawInputs,
    server_url: Option<&str>,
    json: bool,
    save: bool,
) -> Result<()> {
    let result: PredictionResult = match server_url {
        Some(url) => {
            info!(url, "predicting remotely");
            let client = PredictionClient::new(url, Duration::from_secs(30))?;
            client
                .predict(raw)
                .await
                .with_context(|| format!("Remote prediction via {} failed", url))?
        }
        None => load_pipeline(config)?.predict(raw)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        DisplayManager::new().show_result(&result);
    }

    if save {
        let path = config.export_path();
        export::append_result(&path, &result)
            .with_context(|| format!("Failed to append to {}", path.display()))?;
        eprintln!("{} Saved to {}", "✓".green(), path.display());
    }

    Ok(())
}

fn run_batch(
    config: &Config,
    input: &Path,
    output: Option<&Path>,
    verbosity: Verbosity,
) -> Result<()> {
    let pipeline = load_pipeline(config)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| export::output_path_for(input));

    let pb = if verbosity.show_progress() {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} Predicting [{bar:40.cyan/blue}] {pos}/{len} | ETA: {eta}")?
                .progress_chars("=>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let summary = export::run_batch(&pipeline, input, &output, &mut |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })
    .with_context(|| format!("Batch prediction of {} failed", input.display()))?;
    pb.finish_and_clear();

    DisplayManager::new().show_batch_summary(&summary);
    if summary.succeeded == 0 {
        bail!("no rows of {} could be predicted", input.display());
    }
    Ok(())
}

async fn run_doctor(config: &Config, check_server: bool) -> Result<()> {
    let server_url = check_server.then(|| config.server_url());
    let doctor = Doctor::new(config.clone(), server_url);

    let checks = doctor.run_diagnostics().await;
    Doctor::display_results(&checks);

    std::process::exit(if Doctor::overall_status(&checks) { 0 } else { 1 });
}

fn show_config(args: &Args, config: &Config, write: bool) -> Result<()> {
    let path = args.config.clone().or_else(Config::default_path);

    println!("\n{}", "octanebuddy configuration".bold().cyan());
    println!("{}", "=".repeat(60).cyan());
    match &path {
        Some(p) if p.exists() => println!("File: {}\n", p.display()),
        Some(p) => println!("File: {} (not present, showing defaults)\n", p.display()),
        None => println!("File: none (showing defaults)\n"),
    }
    println!("{}", toml::to_string_pretty(config)?);

    if write {
        let Some(path) = path else {
            bail!("no configuration path; pass --config");
        };
        config
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} Wrote {}", "✓".green(), path.display());
    }

    Ok(())
}
