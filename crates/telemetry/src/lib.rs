//! Logging and lightweight metrics for the survey widget tools
//!
//! This crate provides:
//! - Structured logging with tracing (compact or JSON, optional log file)
//! - In-process counters and timing summaries
//! - A per-process session id for correlating logs

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};
use uuid::Uuid;

static METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

/// Random per-process id attached to the startup event
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Keeps the background log-file writer alive; drop it on shutdown to flush.
#[must_use = "dropping the guard stops file logging"]
pub struct TelemetryGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`. When a log file is
/// configured, events are also written there as JSON lines.
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.show_target)
        .with_line_number(config.show_line_number);
    layers.push(if config.json {
        console.json().boxed()
    } else {
        console.compact().boxed()
    });

    let file_guard = match &config.log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), PathBuf::from);
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Log file path has no file name: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(fmt::layer().json().with_ansi(false).with_writer(writer).boxed());
            Some(guard)
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry().with(layers).with(filter);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::info!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _file: file_guard })
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json: bool,
    pub show_target: bool,
    pub show_line_number: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json: false,
            show_target: false,
            show_line_number: false,
            log_file: None,
        }
    }
}

impl TelemetryConfig {
    /// Raise the level for each `-v` on the command line.
    #[must_use]
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        self.log_level = match verbose {
            0 => self.log_level,
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        };
        self
    }
}

/// Process-wide counters and timing samples
#[derive(Debug)]
pub struct Metrics {
    started: Instant,
    inner: Mutex<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    counters: BTreeMap<String, u64>,
    timings: BTreeMap<String, Vec<f64>>,
}

impl Metrics {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            inner: Mutex::new(MetricsInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MetricsInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn increment(&self, name: &str) {
        self.add(name, 1);
    }

    pub fn add(&self, name: &str, amount: u64) {
        *self.lock().counters.entry(name.to_string()).or_insert(0) += amount;
    }

    /// Current value of a counter (0 if never touched)
    pub fn counter(&self, name: &str) -> u64 {
        self.lock().counters.get(name).copied().unwrap_or(0)
    }

    /// Record one timing sample in milliseconds
    pub fn record_ms(&self, name: &str, millis: f64) {
        self.lock()
            .timings
            .entry(name.to_string())
            .or_default()
            .push(millis);
    }

    pub fn timing(&self, name: &str) -> Option<TimingSummary> {
        self.lock()
            .timings
            .get(name)
            .and_then(|samples| TimingSummary::from_samples(samples))
    }

    /// Point-in-time copy of everything recorded so far
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.lock();
        MetricsSnapshot {
            session_id: session_id().to_string(),
            uptime_ms: self.started.elapsed().as_millis() as u64,
            counters: inner.counters.clone(),
            timings: inner
                .timings
                .iter()
                .filter_map(|(name, samples)| {
                    TimingSummary::from_samples(samples).map(|summary| (name.clone(), summary))
                })
                .collect(),
        }
    }
}

/// Serializable view of [`Metrics`]
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub session_id: String,
    pub uptime_ms: u64,
    pub counters: BTreeMap<String, u64>,
    pub timings: BTreeMap<String, TimingSummary>,
}

/// Summary of the samples recorded under one timing name
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingSummary {
    pub count: usize,
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
}

impl TimingSummary {
    /// `None` when there are no samples.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let (&min_ms, &max_ms) = (sorted.first()?, sorted.last()?);
        let count = sorted.len();

        Some(Self {
            count,
            min_ms,
            max_ms,
            mean_ms: sorted.iter().sum::<f64>() / count as f64,
            p50_ms: nearest_rank(&sorted, 0.50),
            p95_ms: nearest_rank(&sorted, 0.95),
        })
    }
}

/// Nearest-rank percentile of a non-empty sorted slice.
fn nearest_rank(sorted: &[f64], fraction: f64) -> f64 {
    let rank = (fraction * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

pub fn metrics() -> &'static Metrics {
    &METRICS
}

/// Measures one operation and records it under `name` in [`metrics`]
///
/// Dropping a timer that was never stopped still records the sample.
pub struct Timer {
    name: String,
    start: Instant,
    recorded: bool,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            recorded: false,
        }
    }

    /// Record the elapsed time and log it at debug level.
    pub fn stop(mut self) -> Duration {
        let elapsed = self.record();
        tracing::debug!(
            timer = %self.name,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Timer stopped"
        );
        elapsed
    }

    fn record(&mut self) -> Duration {
        let elapsed = self.start.elapsed();
        if !self.recorded {
            self.recorded = true;
            metrics().record_ms(&self.name, elapsed.as_secs_f64() * 1000.0);
        }
        elapsed
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.record();
    }
}
