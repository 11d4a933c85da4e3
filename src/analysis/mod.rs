//! Aggregate views over the cleaned crash table.

pub mod aggregator;

pub use aggregator::*;
