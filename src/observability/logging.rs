//! Log filter and format resolution.

use crate::config::{LogFormat, LoggingSettings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Filter used when neither the config nor the environment sets one.
pub const DEFAULT_FILTER: &str = "warn";

/// Filter used for `-v`.
pub const VERBOSE_FILTER: &str = "wordlink=debug,info";

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Log file; stderr when unset.
    pub file: Option<PathBuf>,
    /// Event filter.
    pub filter: EnvFilter,
}

impl LoggingConfig {
    /// Resolves the filter directive.
    ///
    /// `-v` wins, then `WORDLINK_LOG`, then `RUST_LOG`, then the config file,
    /// then [`DEFAULT_FILTER`].
    #[must_use]
    pub fn directive(settings: &LoggingSettings, verbose: bool) -> String {
        if verbose {
            return VERBOSE_FILTER.to_string();
        }
        ["WORDLINK_LOG", "RUST_LOG"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .chain(settings.filter.clone())
            .find(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }

    /// Builds the logging configuration from settings.
    ///
    /// An unparsable directive falls back to [`DEFAULT_FILTER`].
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let directive = Self::directive(settings, verbose);
        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
            tracing::warn!(directive = %directive, error = %e, "Invalid log filter");
            EnvFilter::new(DEFAULT_FILTER)
        });
        Self {
            format: settings.format,
            file: settings.file.clone(),
            filter,
        }
    }
}
