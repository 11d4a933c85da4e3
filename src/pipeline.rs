//! Load, clean and aggregate in one pass.
//!
//! Each stage takes the previous stage's output by value or reference;
//! nothing is shared between runs.

use crate::analysis::Analysis;
use crate::cleaner;
use crate::config::InputConfig;
use crate::error::Result;
use crate::loader;
use crate::models::CrashTable;
use tracing::{info, warn};

/// Output of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: CrashTable,
    pub analysis: Analysis,
}

/// Run loader, cleaner and aggregator over the configured input file.
pub fn run(input: &InputConfig, top_n: usize) -> Result<PipelineOutput> {
    let raw = loader::load_table(&input.path)?;
    let table = cleaner::clean_table(raw, &input.date_formats);
    if table.is_empty() {
        warn!("{} contains no data rows", input.path.display());
    }
    let analysis = Analysis::compute(&table, top_n);

    info!(
        "Aggregated {} years and {} ranked operators",
        analysis.yearly_crashes.len(),
        analysis.top_by_crashes.len()
    );

    Ok(PipelineOutput { table, analysis })
}
