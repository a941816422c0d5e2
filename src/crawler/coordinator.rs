//! Harvest coordinator - discovery and hydration orchestration
//!
//! A [`Harvester`] drives one run through its phases:
//! - Seed resolution: fetch the seed page and read its pagination identifiers
//! - Discovery: walk listing pages three at a time until enough unique links are found
//! - Hydration: fetch detail page and thumbnail for each link, one chunk per batch
//!
//! Batches are pulled by the caller with [`Harvester::next_batch`] or consumed
//! as a stream via [`Harvester::into_stream`].

use crate::config::{validate, Config};
use crate::crawler::cursor::{PageCursor, PageType, RequestDescriptor};
use crate::crawler::dedup::Deduplicator;
use crate::crawler::fetcher::{BoundedFetcher, FailurePolicy, FetchOutcome};
use crate::crawler::parser::{Extractor, LinkPair, Metadata, SelectorExtractor};
use crate::output::stats::{DropReason, HarvestStatistics};
use crate::state::HarvestPhase;
use crate::{HarvestError, Result};
use futures::future::{join_all, try_join_all};
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use std::sync::Arc;
use url::Url;

/// Number of listing pages fetched concurrently per discovery round
pub const DISCOVERY_LOOKAHEAD: usize = 3;

/// Downloaded thumbnail of an article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub url: String,
    pub bytes: Vec<u8>,
}

/// A hydrated article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    /// Article URL as discovered
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<Metadata>,
    pub thumbnail: Thumbnail,
}

/// Orchestrates one harvest run
pub struct Harvester {
    fetcher: BoundedFetcher,
    extractor: Arc<dyn Extractor>,
    dedup: Deduplicator,

    base_url: Url,
    page_type: PageType,
    uid: String,

    /// Number of records requested
    count: usize,
    /// Links hydrated per batch
    chunk_size: usize,
    fail_safe_limit: usize,

    phase: HarvestPhase,

    /// Descriptors fetched before the cursor's own
    pending: VecDeque<RequestDescriptor>,
    cursor: Option<PageCursor>,

    /// Records queued ahead of discovered links (the seed article)
    extras: Vec<LinkPair>,
    /// Links awaiting hydration, in output order
    queue: VecDeque<LinkPair>,

    /// Discovery rounds run so far
    rounds: usize,
    stats: HarvestStatistics,
}

impl Harvester {
    /// Creates a new harvester
    ///
    /// # Arguments
    ///
    /// * `config` - Harvest configuration, validated before use
    /// * `page_type` - Kind of listing to walk
    /// * `uid` - Slug of the trend, list, category or search term
    /// * `dedup` - Caller-owned set of already harvested links
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to produce batches
    /// * `Err(HarvestError)` - Invalid configuration or transport setup
    pub fn new(
        config: &Config,
        page_type: PageType,
        uid: impl Into<String>,
        dedup: Deduplicator,
    ) -> Result<Self> {
        validate(config)?;

        let mut base_url = Url::parse(&config.site.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let uid = uid.into();
        let fetcher = BoundedFetcher::from_config(&config.http)?;
        let extractor: Arc<dyn Extractor> = Arc::new(SelectorExtractor::new(base_url.clone()));

        let (phase, cursor) = if page_type.requires_seed() {
            (HarvestPhase::SeedResolution, None)
        } else {
            let cursor = PageCursor::listing(&base_url, uid.as_str(), page_type, config.harvest.best);
            (HarvestPhase::Discovery, Some(cursor))
        };

        Ok(Self {
            fetcher,
            extractor,
            dedup,
            base_url,
            page_type,
            uid,
            count: config.harvest.count,
            chunk_size: config.harvest.chunk_size,
            fail_safe_limit: config.harvest.fail_safe_limit,
            phase,
            pending: VecDeque::new(),
            cursor,
            extras: Vec::new(),
            queue: VecDeque::new(),
            rounds: 0,
            stats: HarvestStatistics::default(),
        })
    }

    /// Replaces the HTML extractor
    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn phase(&self) -> HarvestPhase {
        self.phase
    }

    pub fn statistics(&self) -> &HarvestStatistics {
        &self.stats
    }

    /// Returns the next hydrated batch
    ///
    /// # Returns
    ///
    /// * `Ok(Some(batch))` - The records of the next chunk, in discovery order
    /// * `Ok(None)` - The run is over (finished or aborted earlier)
    /// * `Err(HarvestError)` - The run failed; later calls return `Ok(None)`
    pub async fn next_batch(&mut self) -> Result<Option<Vec<ContentRecord>>> {
        loop {
            if self.phase.is_terminal() {
                return Ok(None);
            }

            let step = match self.phase {
                HarvestPhase::SeedResolution => self.resolve_seed().await.map(|_| None),
                HarvestPhase::Discovery => self.discover().await.map(|_| None),
                _ => self.hydrate_next_chunk().await,
            };

            match step {
                Ok(Some(batch)) => return Ok(Some(batch)),
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!(
                        "Harvest of {} '{}' aborted during {}: {}",
                        self.page_type,
                        self.uid,
                        self.phase,
                        e
                    );
                    self.phase = HarvestPhase::Fatal;
                    return Err(e);
                }
            }
        }
    }

    /// Converts the harvester into a stream of batches
    ///
    /// The stream ends after the last batch, or right after yielding an error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<ContentRecord>>> {
        stream::try_unfold(self, |mut harvester| async move {
            let batch = harvester.next_batch().await?;
            Ok::<_, HarvestError>(batch.map(|batch| (batch, harvester)))
        })
    }

    fn transition(&mut self, next: HarvestPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::info!("Harvest phase: {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Fetches the seed page and sets up article pagination
    async fn resolve_seed(&mut self) -> Result<()> {
        let seed = RequestDescriptor::new(
            self.base_url
                .join(&format!("{}/{}", self.page_type.as_path(), self.uid))?,
        );
        tracing::info!("Resolving pagination identifiers from {}", seed);

        let page = self.fetcher.fetch_required(&seed).await?;
        self.stats.pages_fetched += 1;

        let metadata = self
            .extractor
            .extract_detail(&page)
            .metadata
            .ok_or_else(|| HarvestError::SeedMetadata {
                url: seed.to_string(),
            })?;

        tracing::debug!(
            "Seed {} has entity id {} and category id {}",
            seed,
            metadata.entity_id,
            metadata.category_id
        );

        if self.page_type.seed_is_article() {
            if let Some(thumbnail_url) = self.extractor.extract_thumbnail_url(&page) {
                if self.dedup.insert(seed.as_str()) {
                    self.extras.push(LinkPair::new(seed.as_str(), thumbnail_url));
                    self.stats.links_accepted += 1;
                } else {
                    tracing::debug!("Seed article {} was already harvested", seed);
                    self.stats.duplicates_skipped += 1;
                }
            }
        }

        self.cursor = Some(PageCursor::article(
            &self.base_url,
            metadata.entity_id,
            metadata.category_id,
            self.page_type,
        )?);
        self.pending.push_back(seed);

        self.transition(HarvestPhase::Discovery)
    }

    /// Collects unique links until the requested count is reached
    async fn discover(&mut self) -> Result<()> {
        let target = self.count.saturating_sub(self.extras.len());
        let mut discovered: Vec<LinkPair> = Vec::with_capacity(target);

        while discovered.len() < target {
            if self.rounds >= self.fail_safe_limit {
                return Err(HarvestError::FailSafeExceeded {
                    iterations: self.rounds,
                });
            }
            self.rounds += 1;

            let requests = self.next_requests(DISCOVERY_LOOKAHEAD);
            tracing::debug!(
                "Discovery round {}: fetching {} listing pages",
                self.rounds,
                requests.len()
            );

            let fetcher = &self.fetcher;
            let pages = try_join_all(requests.iter().map(|r| fetcher.fetch_required(r))).await?;
            self.stats.pages_fetched += pages.len() as u64;

            'pages: for page in &pages {
                for link in self.extractor.extract_links(page) {
                    if discovered.len() >= target {
                        break 'pages;
                    }

                    if self.dedup.insert(&link.url) {
                        discovered.push(link);
                        self.stats.links_accepted += 1;
                    } else {
                        self.stats.duplicates_skipped += 1;
                    }
                }
            }
        }

        tracing::info!(
            "Discovered {} new links in {} rounds ({} extra)",
            discovered.len(),
            self.rounds,
            self.extras.len()
        );

        self.queue = self.extras.drain(..).chain(discovered).collect();
        self.transition(HarvestPhase::Hydration)
    }

    /// Draws descriptors from the pending queue first, then from the cursor
    fn next_requests(&mut self, n: usize) -> Vec<RequestDescriptor> {
        let mut requests = Vec::with_capacity(n);

        while requests.len() < n {
            if let Some(descriptor) = self.pending.pop_front() {
                requests.push(descriptor);
            } else if let Some(cursor) = self.cursor.as_mut() {
                requests.push(cursor.next_request());
            } else {
                break;
            }
        }

        requests
    }

    /// Hydrates the next chunk of queued links
    async fn hydrate_next_chunk(&mut self) -> Result<Option<Vec<ContentRecord>>> {
        if self.queue.is_empty() {
            self.transition(HarvestPhase::Done)?;
            return Ok(None);
        }

        let take = self.chunk_size.min(self.queue.len());
        let chunk: Vec<LinkPair> = self.queue.drain(..take).collect();
        tracing::debug!("Hydrating {} links, {} left", chunk.len(), self.queue.len());

        let fetcher = &self.fetcher;
        let fetched = join_all(chunk.iter().map(|link| async move {
            futures::join!(
                fetcher.fetch_url(&link.url, FailurePolicy::Degrade),
                fetcher.fetch_url(&link.thumbnail_url, FailurePolicy::Degrade)
            )
        }))
        .await;

        let mut batch = Vec::with_capacity(chunk.len());
        for (link, (detail, thumbnail)) in chunk.into_iter().zip(fetched) {
            let url = link.url.clone();
            match self.build_record(link, detail?, thumbnail?) {
                Ok(record) => batch.push(record),
                Err(reason) => {
                    tracing::warn!("Dropping {}: {}", url, reason);
                    self.stats.record_drop(reason);
                }
            }
        }

        self.stats.batches_yielded += 1;
        self.stats.records_yielded += batch.len() as u64;
        tracing::info!("Yielding batch of {} records", batch.len());

        Ok(Some(batch))
    }

    fn build_record(
        &self,
        link: LinkPair,
        detail: FetchOutcome,
        thumbnail: FetchOutcome,
    ) -> std::result::Result<ContentRecord, DropReason> {
        let (Some(page), Some(image)) = (detail.into_resource(), thumbnail.into_resource()) else {
            return Err(DropReason::MissingResource);
        };

        let detail = self.extractor.extract_detail(&page);
        if detail.is_incomplete() {
            return Err(DropReason::ExtractionIncomplete);
        }

        Ok(ContentRecord {
            url: link.url,
            title: detail.title,
            description: detail.description,
            metadata: detail.metadata,
            thumbnail: Thumbnail {
                url: link.thumbnail_url,
                bytes: image.body,
            },
        })
    }
}
