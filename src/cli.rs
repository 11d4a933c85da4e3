//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Crashstats - aviation accident statistics
///
/// Loads a table of plane crash records, cleans the annotated counts and
/// dates, and reports yearly trends and operator rankings as text and
/// SVG charts.
///
/// Examples:
///   crashstats
///   crashstats --input plane_crash.csv --output-dir charts
///   crashstats --format json --no-charts
///   crashstats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Accident records file (defaults to plane_crash.csv)
    #[arg(short, long, value_name = "FILE", env = "CRASHSTATS_INPUT")]
    pub input: Option<PathBuf>,

    /// Directory the SVG charts are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for crashstats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Summary format printed to stdout (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Number of operators kept in each ranking
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Skip chart rendering, print the summary only
    #[arg(long)]
    pub no_charts: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default crashstats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON document
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: None,
            output_dir: None,
            config: None,
            format: OutputFormat::Text,
            top: None,
            no_charts: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::parse_from([
            "crashstats",
            "--input",
            "crashes.csv",
            "--format",
            "json",
            "--top",
            "3",
            "--no-charts",
        ]);
        assert_eq!(args.input, Some(PathBuf::from("crashes.csv")));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.top, Some(3));
        assert!(args.no_charts);
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_top() {
        let mut args = make_args();
        args.top = Some(0);
        assert!(args.validate().is_err());

        args.top = Some(1);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
