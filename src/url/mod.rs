//! URL handling module for Trend-Harvest
//!
//! This module provides link canonicalization for deduplication, href resolution
//! for listing pages, query construction for request descriptors, and the slug
//! rules used to turn user input into remote identifiers.

mod normalize;

use url::Url;

pub use normalize::{canonical_link, resolve_link, unescape};

/// Replaces the query string of `url` with the given parameters
///
/// Parameters are encoded in the order given. An empty parameter list leaves
/// the URL without a query string.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use trend_harvest::url::with_query;
///
/// let base = Url::parse("https://example.com/trends?old=1").unwrap();
/// let url = with_query(&base, &[("act", "lp"), ("p", "2")]);
/// assert_eq!(url.as_str(), "https://example.com/trends?act=lp&p=2");
/// ```
pub fn with_query<K, V>(url: &Url, params: &[(K, V)]) -> Url
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url = url.clone();
    url.set_query(None);

    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key.as_ref(), value.as_ref());
        }
    }

    url
}

/// Converts free text into a URL slug
///
/// Alphanumeric runs are lowercased and joined with `separator`; everything
/// else is treated as a word boundary.
///
/// # Examples
///
/// ```
/// use trend_harvest::url::slugify;
///
/// assert_eq!(slugify("Eco Friendly  Shoes!", "-"), "eco-friendly-shoes");
/// assert_eq!(slugify("Eco Friendly", ""), "ecofriendly");
/// ```
pub fn slugify(text: &str, separator: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(separator)
}
