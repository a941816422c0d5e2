//! Integration tests for Trend-Harvest
//!
//! These tests run the fetcher and the harvester against wiremock servers.

mod fetch_tests;
mod support;
