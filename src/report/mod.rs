//! Report output: stdout summaries and chart files.

pub mod charts;
pub mod generator;

pub use charts::{render_all, ChartOptions};
pub use generator::{generate_json_summary, generate_text_summary, Summary};
