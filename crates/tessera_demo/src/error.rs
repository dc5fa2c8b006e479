//! # Demo Error Types
//!
//! Errors raised while loading and validating the simulation config.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur before the simulation starts.
#[derive(Error, Debug)]
pub enum DemoError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`SimConfig`](crate::SimConfig).
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config parsed but describes an impossible world.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for demo operations.
pub type DemoResult<T> = Result<T, DemoError>;
