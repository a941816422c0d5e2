//! Trend-Harvest main entry point
//!
//! This is the command-line interface for the Trend-Harvest listing harvester.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use trend_harvest::config::{load_config_with_hash, validate, Config};
use trend_harvest::output::{log_records, print_statistics};
use trend_harvest::{slugify, Deduplicator, Harvester, PageType};

/// Trend-Harvest: a paginated listing harvester
///
/// Trend-Harvest walks the listing pages around a trend, list, category or
/// search term, collects unique article links and hydrates each one with its
/// title, description, identifiers and thumbnail.
#[derive(Parser, Debug)]
#[command(name = "trend-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A paginated listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest the articles related to a trend
    Trends(HarvestArgs),

    /// Harvest the articles around a curated list
    Lists(HarvestArgs),

    /// Harvest a category listing
    Categories(HarvestArgs),

    /// Harvest search results
    Search(HarvestArgs),
}

impl Command {
    fn page_type(&self) -> PageType {
        match self {
            Self::Trends(_) => PageType::Trend,
            Self::Lists(_) => PageType::List,
            Self::Categories(_) => PageType::Category,
            Self::Search(_) => PageType::Search,
        }
    }

    fn args(&self) -> &HarvestArgs {
        match self {
            Self::Trends(args)
            | Self::Lists(args)
            | Self::Categories(args)
            | Self::Search(args) => args,
        }
    }
}

#[derive(Args, Debug)]
struct HarvestArgs {
    /// Trend, list or category name, or search term
    uid: String,

    /// Number of articles to harvest
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Articles hydrated per batch
    #[arg(short = 'k', long)]
    chunk_size: Option<usize>,

    /// Maximum number of requests in flight
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,

    /// HTTP proxy for the primary transport
    #[arg(short = 'p', long)]
    proxy: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    /// Requests per second (enables rate limiting)
    #[arg(long)]
    rate: Option<f64>,

    /// Rate limiter burst capacity
    #[arg(long)]
    burst: Option<f64>,

    /// Use the "best" sort order for category and search listings
    #[arg(long)]
    best: bool,

    /// Root URL of the site
    #[arg(long)]
    base_url: Option<String>,
}

impl HarvestArgs {
    /// Applies command-line overrides on top of the file configuration
    fn apply(&self, config: &mut Config) {
        if let Some(count) = self.count {
            config.harvest.count = count;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.harvest.chunk_size = chunk_size;
        }
        if self.best {
            config.harvest.best = true;
        }
        if let Some(concurrency) = self.concurrency {
            config.http.concurrency = concurrency;
        }
        if let Some(proxy) = &self.proxy {
            config.http.proxy = Some(proxy.clone());
        }
        if let Some(timeout) = self.timeout {
            config.http.timeout_secs = timeout;
        }
        if let Some(rate) = self.rate {
            config.http.rate = Some(rate);
        }
        if let Some(burst) = self.burst {
            config.http.burst = Some(burst);
        }
        if let Some(base_url) = &self.base_url {
            config.site.base_url = base_url.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    let args = cli.command.args();
    args.apply(&mut config);

    if let Err(e) = validate(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    handle_harvest(&config, cli.command.page_type(), &args.uid).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trend_harvest=info,warn"),
            1 => EnvFilter::new("trend_harvest=debug,info"),
            2 => EnvFilter::new("trend_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Runs a harvest to completion, logging each batch as it arrives
async fn handle_harvest(
    config: &Config,
    page_type: PageType,
    uid: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let uid = slugify(uid, page_type.slug_separator());
    tracing::info!(
        "Harvesting {} articles from {} '{}' in chunks of {}",
        config.harvest.count,
        page_type,
        uid,
        config.harvest.chunk_size
    );

    let mut harvester = Harvester::new(config, page_type, uid, Deduplicator::new())?;

    let result = loop {
        match harvester.next_batch().await {
            Ok(Some(batch)) => {
                tracing::info!("Received batch of {} records", batch.len());
                log_records(&batch);
            }
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    print_statistics(harvester.statistics());

    match result {
        Ok(()) => {
            tracing::info!("Harvest completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
