//! Deduplication of discovered article links
//!
//! Links are keyed by their canonical form (see [`canonical_link`]), so the
//! same article reached through different query strings is only harvested once.

use crate::url::{canonical_link, unescape};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Set of canonical article URLs already accepted
///
/// Cloning a `Deduplicator` shares the underlying set, which lets a caller
/// reuse one instance across several sequential harvests. Entries are never
/// removed.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    seen: Arc<Mutex<HashSet<String>>>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identity used for `link`
    ///
    /// Links that cannot be parsed are compared verbatim (minus escaping).
    pub fn key(link: &str) -> String {
        canonical_link(link)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| unescape(link).trim().to_string())
    }

    /// Returns true if `link` has already been recorded
    pub fn seen(&self, link: &str) -> bool {
        self.lock().contains(&Self::key(link))
    }

    /// Records `link` as seen
    pub fn record(&self, link: &str) {
        self.lock().insert(Self::key(link));
    }

    /// Records `link` and returns true if it had not been seen before
    ///
    /// Check and insert happen under one lock.
    pub fn insert(&self, link: &str) -> bool {
        self.lock().insert(Self::key(link))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked mid-insert
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
