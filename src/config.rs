//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `crashstats.toml` files.

use crate::cleaner::default_date_formats;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "crashstats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input file settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where the accident records come from and how to read them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path to the delimited accident file.
    #[serde(default = "default_input_path")]
    pub path: PathBuf,

    /// `chrono` formats tried, in order, on the `Date` column.
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            date_formats: default_date_formats(),
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("plane_crash.csv")
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory charts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Operators kept in each ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Ranking entries echoed in the text summary.
    #[serde(default = "default_preview")]
    pub preview: usize,

    /// Chart width in pixels.
    #[serde(default = "default_chart_width")]
    pub chart_width: u32,

    /// Chart height in pixels.
    #[serde(default = "default_chart_height")]
    pub chart_height: u32,

    /// Render the chart files at all.
    #[serde(default = "default_true")]
    pub render_charts: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            top_n: default_top_n(),
            preview: default_preview(),
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
            render_charts: true,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("charts")
}

fn default_top_n() -> usize {
    10
}

fn default_preview() -> usize {
    5
}

fn default_chart_width() -> u32 {
    1000
}

fn default_chart_height() -> u32 {
    600
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| PipelineError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.input.path = input.clone();
        }
        if let Some(ref output_dir) = args.output_dir {
            self.report.output_dir = output_dir.clone();
        }
        if let Some(top) = args.top {
            self.report.top_n = top;
        }

        if args.no_charts {
            self.report.render_charts = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
