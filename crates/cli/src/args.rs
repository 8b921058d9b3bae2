//! Global command-line flags
//!
//! Flatten [`GlobalArgs`] into a binary's top-level `Parser` to get the
//! shared `--config`, `-v` and `--log-format` options.

use clap::{ArgAction, Args, ValueEnum};
use std::path::PathBuf;
use survey_core::config::{LogFormat, LoggingConfig};
use survey_telemetry::TelemetryConfig;

/// Log output format selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable single-line events
    Compact,
    /// One JSON object per event
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Flags accepted by every command
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Path to a configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format (overrides the configuration file)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormatArg>,
}

impl GlobalArgs {
    /// Combine the `[logging]` section with the command-line overrides.
    pub fn telemetry_config(&self, logging: &LoggingConfig) -> TelemetryConfig {
        let format = self.log_format.map_or(logging.format, LogFormat::from);
        TelemetryConfig {
            log_level: logging.level.clone(),
            json: format == LogFormat::Json,
            log_file: logging.file.clone(),
            ..TelemetryConfig::default()
        }
        .with_verbosity(self.verbose)
    }
}
