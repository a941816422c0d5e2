use crate::UrlError;
use url::Url;

/// Reduces an article URL to the identity used for deduplication
///
/// # Canonicalization Steps
///
/// 1. Remove JSON escaping backslashes (`https:\/\/...`)
/// 2. Parse the URL; reject if malformed or not HTTP(S)
/// 3. Drop the fragment
/// 4. Drop the query string
/// 5. Remove a trailing slash (except for root /)
///
/// The host is lowercased by the parser.
///
/// # Examples
///
/// ```
/// use trend_harvest::url::canonical_link;
///
/// let url = canonical_link("https://WWW.Example.com/trends/shoe/?utm=x#top").unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/trends/shoe");
/// ```
pub fn canonical_link(url_str: &str) -> Result<Url, UrlError> {
    let unescaped = unescape(url_str);
    let mut url = Url::parse(unescaped.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    url.set_query(None);

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        url.set_path(if trimmed.is_empty() { "/" } else { &trimmed });
    }

    Ok(url)
}

/// Resolves an href found in a listing page to an absolute URL
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel:, data: schemes
/// - non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = unescape(href);
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}

/// Strips the backslashes the listing API leaves in escaped markup
pub fn unescape(value: &str) -> String {
    value.replace('\\', "")
}
