//! Configuration module for Trend-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use trend_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Chunk size: {}", config.harvest.chunk_size);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, HarvestSettings, HttpConfig, SiteConfig, DEFAULT_BASE_URL};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
