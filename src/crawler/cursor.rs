//! Pagination cursor for the listing API
//!
//! The cursor only builds request descriptors; it never touches the network.
//! Both pagination variants share one page counter and differ only in the
//! parameters they attach to each request.

use std::fmt;
use url::Url;

use crate::url::with_query;

/// Value of the `act` parameter that asks the site for a listing page
pub const LOAD_PAGE_ACTION: &str = "lp";

/// Value of the `aj` parameter marking an AJAX pagination request
pub const AJAX_INCREMENT: &str = "1";

/// Kind of listing a harvest walks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageType {
    /// A single trend article and the related articles listed around it
    Trend,
    /// A curated list (slideshow) of articles
    List,
    /// A category listing
    Category,
    /// Search results
    Search,
}

impl PageType {
    /// Returns the path segment the site uses for this page type
    pub fn as_path(&self) -> &'static str {
        match self {
            Self::Trend => "trends",
            Self::List => "slideshow",
            Self::Category => "category",
            Self::Search => "search",
        }
    }

    /// Returns true if pagination identifiers must be resolved from a seed page first
    pub fn requires_seed(&self) -> bool {
        matches!(self, Self::Trend | Self::List)
    }

    /// Returns true if the seed page is itself an article worth harvesting
    pub fn seed_is_article(&self) -> bool {
        matches!(self, Self::Trend)
    }

    /// Returns the separator used when slugifying a user-supplied identifier
    pub fn slug_separator(&self) -> &'static str {
        match self {
            Self::Category => "",
            _ => "-",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_path())
    }
}

/// A fully-formed request target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestDescriptor {
    url: Url,
}

impl RequestDescriptor {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Returns the value of a query parameter, if present
    pub fn param(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Parameter builder for each pagination variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorMode {
    /// Pages through the context of an article: the first request is keyed by
    /// the entity id, every later one by the category id
    Article {
        entity_id: String,
        category_id: String,
    },

    /// Pages through a listing type keyed by a fixed subject id
    Listing {
        subject_id: String,
        page_type: PageType,
        best: bool,
    },
}

impl CursorMode {
    fn params(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("act", LOAD_PAGE_ACTION.to_string()),
            ("p", page.to_string()),
            ("aj", AJAX_INCREMENT.to_string()),
        ];

        match self {
            Self::Article {
                entity_id,
                category_id,
            } => {
                if page == 1 {
                    params.push(("eid", entity_id.clone()));
                } else {
                    params.push(("cid", category_id.clone()));
                }
            }
            Self::Listing {
                subject_id,
                page_type,
                best,
            } => {
                params.push(("pt", page_type.as_path().to_string()));
                params.push(("v", subject_id.clone()));
                params.push(("t", PageType::Trend.as_path().to_string()));
                if *best {
                    params.push(("sort", "best".to_string()));
                }
            }
        }

        params
    }
}

/// Single-pass generator of pagination request descriptors
///
/// The page index starts at 0 and is incremented before each descriptor is
/// built, so the first descriptor is page 1. A fresh traversal needs a new cursor.
#[derive(Debug, Clone)]
pub struct PageCursor {
    target: Url,
    mode: CursorMode,
    page: u32,
}

impl PageCursor {
    /// Creates an article-pagination cursor targeting `{base}/{page_type}`
    pub fn article(
        base_url: &Url,
        entity_id: impl Into<String>,
        category_id: impl Into<String>,
        page_type: PageType,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            target: base_url.join(page_type.as_path())?,
            mode: CursorMode::Article {
                entity_id: entity_id.into(),
                category_id: category_id.into(),
            },
            page: 0,
        })
    }

    /// Creates a listing-type cursor targeting the site root
    pub fn listing(
        base_url: &Url,
        subject_id: impl Into<String>,
        page_type: PageType,
        best: bool,
    ) -> Self {
        Self {
            target: base_url.clone(),
            mode: CursorMode::Listing {
                subject_id: subject_id.into(),
                page_type,
                best,
            },
            page: 0,
        }
    }

    /// Number of descriptors produced so far
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn mode(&self) -> &CursorMode {
        &self.mode
    }

    /// Advances the cursor and returns the next descriptor
    pub fn next_request(&mut self) -> RequestDescriptor {
        self.page += 1;
        RequestDescriptor::new(with_query(&self.target, &self.mode.params(self.page)))
    }
}

impl Iterator for PageCursor {
    type Item = RequestDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_request())
    }
}
