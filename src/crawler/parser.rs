//! HTML extraction for listing and article pages
//!
//! The harvester only depends on the [`Extractor`] trait. [`SelectorExtractor`]
//! is the default implementation, written against the site's markup:
//! - Listing links: `a.thar[href]` pointing at `/trends/`, with an `img[data-src]` thumbnail
//! - Title: `h2.tha__title2`
//! - Description: `div.tha__articleText`
//! - Metadata: `div.th__article[data-eid][data-cid]`
//! - Main image: `img.gal__mainImage[data-src]`

use crate::crawler::fetcher::Resource;
use crate::url::{resolve_link, unescape};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// An article link discovered on a listing page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkPair {
    /// Absolute article URL
    pub url: String,

    /// Absolute thumbnail URL
    pub thumbnail_url: String,
}

impl LinkPair {
    pub fn new(url: impl Into<String>, thumbnail_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            thumbnail_url: thumbnail_url.into(),
        }
    }
}

/// Article id and category id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Metadata {
    pub entity_id: String,
    pub category_id: String,
}

/// Text fields extracted from an article page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleDetail {
    pub title: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<Metadata>,
}

impl ArticleDetail {
    /// Returns true if none of title, description or metadata was found
    pub fn is_incomplete(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.metadata.is_none()
    }
}

/// Pulls links and fields out of fetched pages
pub trait Extractor: Send + Sync {
    /// Returns the article links listed on a page, in page order
    fn extract_links(&self, page: &Resource) -> Vec<LinkPair>;

    /// Returns the title, description and metadata of an article page
    fn extract_detail(&self, page: &Resource) -> ArticleDetail;

    /// Returns the main image URL of an article page
    fn extract_thumbnail_url(&self, page: &Resource) -> Option<String>;
}

/// CSS-selector based extractor for the site's markup
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    base_url: Url,
}

impl SelectorExtractor {
    /// Creates an extractor resolving relative links against `base_url`
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

impl Extractor for SelectorExtractor {
    fn extract_links(&self, page: &Resource) -> Vec<LinkPair> {
        let document = Html::parse_document(&page.text());
        let mut links = Vec::new();

        let (Ok(anchor_selector), Ok(image_selector)) = (
            Selector::parse("a.thar[href]"),
            Selector::parse("img[data-src]"),
        ) else {
            return links;
        };

        for anchor in document.select(&anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };

            if !unescape(href).contains("/trends/") {
                continue;
            }

            // Links without a thumbnail are layout chrome, not articles
            let Some(src) = anchor
                .select(&image_selector)
                .next()
                .and_then(|image| image.value().attr("data-src"))
            else {
                continue;
            };

            if let (Some(url), Some(thumbnail)) = (
                resolve_link(href, &self.base_url),
                resolve_link(src, &self.base_url),
            ) {
                links.push(LinkPair::new(url.to_string(), thumbnail.to_string()));
            }
        }

        links
    }

    fn extract_detail(&self, page: &Resource) -> ArticleDetail {
        let document = Html::parse_document(&page.text());

        ArticleDetail {
            title: select_text(&document, "h2.tha__title2"),
            description: select_text(&document, "div.tha__articleText"),
            metadata: extract_metadata(&document),
        }
    }

    fn extract_thumbnail_url(&self, page: &Resource) -> Option<String> {
        let document = Html::parse_document(&page.text());
        let selector = Selector::parse("img.gal__mainImage[data-src]").ok()?;

        document
            .select(&selector)
            .next()
            .and_then(|image| image.value().attr("data-src"))
            .and_then(|src| resolve_link(src, &self.base_url))
            .map(|url| url.to_string())
    }
}

/// Returns the trimmed text of the first element matching `selector`
fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;

    document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extracts the entity/category pair from the article container
fn extract_metadata(document: &Html) -> Option<Metadata> {
    let selector = Selector::parse("div.th__article[data-eid][data-cid]").ok()?;
    let element = document.select(&selector).next()?;

    Some(Metadata {
        entity_id: element.value().attr("data-eid")?.to_string(),
        category_id: element.value().attr("data-cid")?.to_string(),
    })
}
