//! Crawler module for listing discovery and article hydration
//!
//! This module contains the core harvesting logic, including:
//! - Pagination cursors for the listing API
//! - Bounded HTTP fetching with a fallback transport
//! - Token-bucket rate limiting and concurrency admission
//! - Link deduplication and HTML extraction
//! - Overall harvest coordination

mod coordinator;
pub mod cursor;
mod dedup;
pub mod fetcher;
pub mod limiter;
pub mod parser;
pub mod scheduler;

pub use coordinator::{ContentRecord, Harvester, Thumbnail, DISCOVERY_LOOKAHEAD};
pub use cursor::{PageCursor, PageType, RequestDescriptor};
pub use dedup::Deduplicator;
pub use fetcher::{BoundedFetcher, FailurePolicy, FetchOutcome, Resource};
pub use limiter::{RateLimiter, RatePermit};
pub use parser::{ArticleDetail, Extractor, LinkPair, Metadata, SelectorExtractor};
pub use scheduler::Scheduler;

use crate::config::Config;
use crate::Result;
use futures::Stream;

/// Starts a harvest and returns its batches as a stream
///
/// This is the main entry point for library callers. It will:
/// 1. Build the transport and scheduler from `config.http`
/// 2. Resolve the seed page when `page_type` needs one
/// 3. Discover `config.harvest.count` unique links
/// 4. Yield hydrated records in chunks of `config.harvest.chunk_size`
///
/// Nothing is fetched until the stream is polled.
///
/// # Example
///
/// ```no_run
/// use futures::StreamExt;
/// use trend_harvest::{harvest, Config, Deduplicator, PageType};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stream = harvest(&Config::default(), PageType::Category, "tech", Deduplicator::new())?;
/// futures::pin_mut!(stream);
///
/// while let Some(batch) = stream.next().await {
///     for record in batch? {
///         println!("{}", record.url);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub fn harvest(
    config: &Config,
    page_type: PageType,
    uid: impl Into<String>,
    dedup: Deduplicator,
) -> Result<impl Stream<Item = Result<Vec<ContentRecord>>>> {
    Ok(Harvester::new(config, page_type, uid, dedup)?.into_stream())
}
