use std::path::PathBuf;

use thiserror::Error;

/// Errors related to loading and validating dashboard configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while drawing the dashboard.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing to the terminal or the chart directory failed.
    #[error("failed to write dashboard output")]
    Io(#[from] std::io::Error),

    /// A chart could not be drawn or saved.
    #[error("failed to draw {chart} chart: {message}")]
    Chart { chart: &'static str, message: String },
}
