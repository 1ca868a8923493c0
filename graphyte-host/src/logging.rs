//! Console logging
//!
//! Everything goes to stderr; stdout carries only user-facing output.

use color_eyre::Report;
use tracing::Level;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Filter directives, checked before `RUST_LOG`
pub const LOG_ENV: &str = "GRAPHYTE_LOG";

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level used when no directives are given
    pub default_level: Level,
    /// Directives from the environment
    pub directives: Option<String>,
    /// Include module targets in each line
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            directives: None,
            with_target: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    pub fn from_env() -> Self {
        let directives = std::env::var(LOG_ENV)
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .filter(|d| !d.trim().is_empty());

        Self {
            directives,
            ..Self::default()
        }
    }

    /// Build the filter for the console layer
    pub fn filter(&self) -> Result<EnvFilter, Report> {
        let builder = EnvFilter::builder().with_default_directive(self.default_level.into());
        match &self.directives {
            Some(directives) => Ok(builder.parse(directives)?),
            None => Ok(builder.parse("")?),
        }
    }
}

/// Install the global subscriber
pub fn init_logging(config: LoggingConfig) -> Result<(), Report> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_filter(config.filter()?);

    tracing_subscriber::registry().with(console_layer).try_init()?;
    Ok(())
}
