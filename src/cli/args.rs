//! Command-line argument parsing for octanebuddy
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// octanebuddy - Octane number prediction and fiscal classification of gasolines
#[derive(Parser, Debug)]
#[command(name = "octanebuddy")]
#[command(version)]
#[command(
    about = "Predict the octane number of a gasoline from its chromatographic composition",
    long_about = None
)]
pub struct Args {
    /// Model artifact (JSON); overrides [model] path
    #[arg(short, long, global = true)]
    pub model: Option<PathBuf>,

    /// Server host; overrides [server] host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Server port; overrides [server] port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand (interactive mode when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start interactive menu mode
    Start,

    /// Serve the REST API and web dashboard
    Serve,

    /// Predict a single sample given as NAME=VALUE pairs
    Predict {
        /// Composition values, e.g. PARAFINAS=10.5 AROMATICOS=38
        #[arg(value_name = "NAME=VALUE", value_parser = parse_assignment)]
        values: Vec<(String, String)>,

        /// Use the built-in example sample
        #[arg(long, conflicts_with = "values")]
        example: bool,

        /// Post to a running server instead of loading the model
        #[arg(long, value_name = "URL")]
        server: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Append the result to the export CSV
        #[arg(long)]
        save: bool,
    },

    /// Predict every row of a CSV file
    Batch {
        /// Input CSV with one sample per row
        input: PathBuf,

        /// Output CSV (default: <input>_predictions.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show model information
    Info,

    /// Show valid and typical variable ranges
    Ranges,

    /// Show fiscal categories and customs codes
    Categories,

    /// Run diagnostics on model, configuration and export location
    Doctor,

    /// Display current configuration
    Config {
        /// Write the effective configuration to the config path
        #[arg(long)]
        write: bool,
    },
}

/// Parse `NAME=VALUE`; the value is validated later by the pipeline
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Subcommand to run, defaulting to interactive mode
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Start)
    }
}

impl Verbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Tracing level, falling back to the configured one at normal verbosity
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => configured,
            Verbosity::Verbose => "debug",
            Verbosity::VeryVerbose => "trace",
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show advisory details
    pub fn show_details(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
