//! Error types for the pipeline stages.
//!
//! Only structural problems are errors. Malformed cell values are never
//! reported here; the cleaner turns them into missing values instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading, configuring or rendering.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input file could not be opened or read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input file is not a valid delimited file.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A data row has more cells than the header row.
    #[error("Failed to parse {path}: expected {expected} fields in line {line}, saw {found}")]
    TooManyFields {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A column the pipeline depends on is absent from the header row.
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A chart could not be drawn or written.
    #[error("Failed to render chart '{chart}': {message}")]
    Chart { chart: String, message: String },

    /// A configuration file is unreadable or malformed.
    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl PipelineError {
    /// Build a [`PipelineError::Chart`] from any displayable backend error.
    pub fn chart(chart: &str, err: impl std::fmt::Display) -> Self {
        Self::Chart {
            chart: chart.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result alias used by the pipeline stages.
pub type Result<T> = std::result::Result<T, PipelineError>;
