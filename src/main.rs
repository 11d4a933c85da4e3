//! Crashstats - aviation accident statistics
//!
//! A CLI tool that loads a table of plane crash records, cleans the
//! annotated counts and free-text dates, and reports yearly trends and
//! operator rankings.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Input, configuration or rendering error

mod analysis;
mod cleaner;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod pipeline;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use report::{ChartOptions, Summary};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Crashstats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default crashstats.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to change the input file, date formats and chart output.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so the summary on stdout can be piped.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load, clean, aggregate, then print the summary and render the charts.
fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let output = pipeline::run(&config.input, config.report.top_n)
        .with_context(|| format!("Could not analyze {}", config.input.path.display()))?;

    debug!("Cleaned table holds {} records", output.table.len());

    let summary = Summary::new(&output.analysis, config.report.preview);
    let text = match args.format {
        OutputFormat::Json => report::generate_json_summary(&summary)?,
        OutputFormat::Text => report::generate_text_summary(&summary),
    };
    println!("{}", text.trim_end());

    if config.report.render_charts {
        let options = ChartOptions {
            output_dir: config.report.output_dir.clone(),
            size: (config.report.chart_width, config.report.chart_height),
            show_progress: !args.quiet,
        };
        let written = report::render_all(&output.analysis, &options)?;
        for path in &written {
            debug!("Chart: {}", path.display());
        }
    } else {
        debug!("Chart rendering disabled");
    }

    info!("Done in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Ok(Config::load(config_path)?);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
