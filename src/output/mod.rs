//! Output module for harvested records and run summaries
//!
//! This module handles:
//! - Formatting hydrated records for the console
//! - Counting what a run fetched, accepted and dropped

pub mod console;
pub mod stats;

pub use console::{format_record, log_records};
pub use stats::{print_statistics, DropReason, HarvestStatistics};
