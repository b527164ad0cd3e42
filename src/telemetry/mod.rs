//! Telemetry for octanebuddy
//!
//! Tracing subscriber setup plus in-process prediction counters shared by
//! the REST server and the REPL.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::errors::{PredictorError, Result};
use crate::pipeline::FiscalCategory;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| PredictorError::ConfigError(format!("Failed to init logging: {}", e)))?;
    } else {
        subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| PredictorError::ConfigError(format!("Failed to init logging: {}", e)))?;
    }

    debug!(level, json, "logging initialized");
    Ok(())
}

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    PredictionServed {
        category: FiscalCategory,
        value: f64,
        extrapolated: bool,
        duration: Duration,
        timestamp: Instant,
    },
    PredictionRejected {
        kind: &'static str,
        timestamp: Instant,
    },
    PredictionFailed {
        message: String,
        timestamp: Instant,
    },
    ExportWritten {
        rows: usize,
        timestamp: Instant,
    },
}

/// Telemetry statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetryStats {
    pub predictions: usize,
    pub rejected: usize,
    pub failed: usize,
    pub extrapolated: usize,
    pub exported_rows: usize,
    pub by_category: BTreeMap<String, usize>,
    pub last_value: Option<f64>,
    pub mean_latency_ms: f64,
    pub uptime_seconds: u64,
}

#[derive(Debug, Default)]
struct Counters {
    stats: TelemetryStats,
    total_latency: Duration,
}

/// Telemetry collector
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
    counters: Arc<Mutex<Counters>>,
    start_time: Instant,
    max_events: usize,
}

/// A poisoned lock only means a panic elsewhere; counters stay usable
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    /// Keep at most `max_events` recent events
    pub fn with_capacity(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            counters: Arc::new(Mutex::new(Counters::default())),
            start_time: Instant::now(),
            max_events,
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut counters = lock(&self.counters);
            match &event {
                TelemetryEvent::PredictionServed {
                    category,
                    value,
                    extrapolated,
                    duration,
                    ..
                } => {
                    counters.total_latency += *duration;
                    let stats = &mut counters.stats;
                    stats.predictions += 1;
                    if *extrapolated {
                        stats.extrapolated += 1;
                    }
                    *stats.by_category.entry(category.to_string()).or_insert(0) += 1;
                    stats.last_value = Some(*value);
                }
                TelemetryEvent::PredictionRejected { .. } => counters.stats.rejected += 1,
                TelemetryEvent::PredictionFailed { .. } => counters.stats.failed += 1,
                TelemetryEvent::ExportWritten { rows, .. } => counters.stats.exported_rows += rows,
            }
        }

        let mut events = lock(&self.events);
        events.push(event);
        if events.len() > self.max_events {
            let excess = events.len() - self.max_events;
            events.drain(..excess);
        }
    }

    pub fn served(
        &self,
        category: FiscalCategory,
        value: f64,
        extrapolated: bool,
        duration: Duration,
    ) {
        self.record(TelemetryEvent::PredictionServed {
            category,
            value,
            extrapolated,
            duration,
            timestamp: Instant::now(),
        });
    }

    /// Record a pipeline error under the matching counter
    pub fn error(&self, err: &PredictorError) {
        let event = if err.is_validation() {
            TelemetryEvent::PredictionRejected {
                kind: err.kind(),
                timestamp: Instant::now(),
            }
        } else {
            TelemetryEvent::PredictionFailed {
                message: err.to_string(),
                timestamp: Instant::now(),
            }
        };
        self.record(event);
    }

    pub fn exported(&self, rows: usize) {
        self.record(TelemetryEvent::ExportWritten {
            rows,
            timestamp: Instant::now(),
        });
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        let counters = lock(&self.counters);
        let mut stats = counters.stats.clone();
        if stats.predictions > 0 {
            stats.mean_latency_ms =
                counters.total_latency.as_secs_f64() * 1000.0 / stats.predictions as f64;
        }
        stats.uptime_seconds = self.elapsed().as_secs();
        stats
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn event_count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Get recent events (last n)
    pub fn recent_events(&self, n: usize) -> Vec<TelemetryEvent> {
        let events = lock(&self.events);
        let start = events.len().saturating_sub(n);
        events[start..].to_vec()
    }

    /// Share of requests that produced a prediction
    pub fn success_rate(&self) -> f64 {
        let counters = lock(&self.counters);
        let stats = &counters.stats;
        let total = stats.predictions + stats.rejected + stats.failed;
        if total == 0 {
            1.0
        } else {
            stats.predictions as f64 / total as f64
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}
