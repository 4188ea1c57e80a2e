//! Logging configuration using tracing
//!
//! The binary builds a [`LogConfig`] from its flags and hands it to [`init`];
//! nothing is configured implicitly. `RUST_LOG`, when set, takes precedence
//! over the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One line per event
    #[default]
    Compact,
    /// Multi-line, with source locations
    Pretty,
}

/// Explicit logging setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive used when RUST_LOG is unset (e.g. "info", "jira_glue=debug")
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl LogConfig {
    /// Level from a `-v` count: 0 → warn, 1 → info, 2 → debug, 3+ → trace
    pub fn from_verbosity(verbose: u8) -> Self {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        Self {
            level: level.to_string(),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Initialize the tracing subscriber, writing to stderr
///
/// # Errors
/// Returns an error if a subscriber has already been initialized
pub fn init(config: &LogConfig) -> crate::Result<()> {
    let registry = tracing_subscriber::registry().with(config.filter());

    let result = match config.format {
        LogFormat::Compact => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true).compact())
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .try_init(),
    };

    result.map_err(|e| crate::GlueError::Config(format!("Failed to initialize tracing: {}", e)))
}
