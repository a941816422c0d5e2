//! Run statistics for a harvest
//!
//! The harvester updates these counters as it goes; the binary prints them
//! once the stream has finished.

use std::collections::HashMap;
use std::fmt;

/// Why a discovered link did not become a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The detail page or the thumbnail could not be fetched
    MissingResource,

    /// The detail page had no title, description or metadata
    ExtractionIncomplete,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingResource => write!(f, "missing resource"),
            Self::ExtractionIncomplete => write!(f, "extraction incomplete"),
        }
    }
}

/// Harvest statistics summary
#[derive(Debug, Clone, Default)]
pub struct HarvestStatistics {
    /// Listing and seed pages fetched
    pub pages_fetched: u64,

    /// Links accepted by the deduplicator (extras included)
    pub links_accepted: u64,

    /// Links rejected because they had already been seen
    pub duplicates_skipped: u64,

    /// Batches handed to the caller
    pub batches_yielded: u64,

    /// Records handed to the caller
    pub records_yielded: u64,

    /// Dropped links by reason
    pub dropped: HashMap<DropReason, u64>,
}

impl HarvestStatistics {
    pub fn record_drop(&mut self, reason: DropReason) {
        *self.dropped.entry(reason).or_insert(0) += 1;
    }

    pub fn total_dropped(&self) -> u64 {
        self.dropped.values().sum()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Discovery:");
    println!("  Listing pages fetched: {}", stats.pages_fetched);
    println!("  Links accepted: {}", stats.links_accepted);
    println!("  Duplicates skipped: {}", stats.duplicates_skipped);
    println!();

    println!("Hydration:");
    println!("  Batches yielded: {}", stats.batches_yielded);
    println!("  Records yielded: {}", stats.records_yielded);
    println!();

    if !stats.dropped.is_empty() {
        println!("Dropped Links:");
        let mut drops: Vec<_> = stats.dropped.iter().collect();
        drops.sort_by(|a, b| b.1.cmp(a.1));

        for (reason, count) in drops {
            println!("  {}: {}", reason, count);
        }
        println!();
    }

    let success_rate = if stats.links_accepted > 0 {
        (stats.records_yielded as f64 / stats.links_accepted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} links hydrated)",
        success_rate, stats.records_yielded, stats.links_accepted
    );
}
