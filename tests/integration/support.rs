//! Mock site used by the integration tests
//!
//! [`Site`] answers listing requests by their `p` parameter, serves one
//! article page per `/trends/{slug}` path and one image per `/img/{slug}.jpg`.

use std::collections::HashSet;
use trend_harvest::config::{Config, SiteConfig};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Seed page served at `/{page_type}/{uid}`
#[derive(Clone)]
pub struct Seed {
    pub path: String,
    pub related: Vec<String>,
    pub with_metadata: bool,
    pub with_main_image: bool,
}

#[derive(Clone, Default)]
pub struct Site {
    /// Listing path, `/` for listing-type pagination
    pub listing_path: String,
    /// Slugs listed on each page, page 1 first
    pub pages: Vec<Vec<String>>,
    /// Serve the first page for every page number
    pub repeat_first_page: bool,
    pub seed: Option<Seed>,
    pub missing_images: HashSet<String>,
    pub incomplete_articles: HashSet<String>,
}

impl Site {
    pub fn listing(listing_path: &str, pages: &[&[&str]]) -> Self {
        Self {
            listing_path: listing_path.to_string(),
            pages: pages
                .iter()
                .map(|page| page.iter().map(|s| s.to_string()).collect())
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, path: &str, related: &[&str]) -> Self {
        self.seed = Some(Seed {
            path: path.to_string(),
            related: related.iter().map(|s| s.to_string()).collect(),
            with_metadata: true,
            with_main_image: true,
        });
        self
    }

    pub async fn mount(self, server: &MockServer) {
        Mock::given(any()).respond_with(self).mount(server).await;
    }

    fn listing_page(&self, page: usize) -> Vec<String> {
        let index = if self.repeat_first_page { 0 } else { page.wrapping_sub(1) };
        self.pages.get(index).cloned().unwrap_or_default()
    }
}

impl Respond for Site {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let path = request.url.path();

        if path == self.listing_path && param(request, "act").is_some() {
            let page = param(request, "p")
                .and_then(|p| p.parse().ok())
                .unwrap_or(0);
            let slugs = self.listing_page(page);
            return html(&links_html(&slugs));
        }

        if let Some(seed) = &self.seed {
            if path == seed.path {
                let slug = seed.path.rsplit('/').next().unwrap_or_default();
                let mut body = if seed.with_metadata {
                    article_html(slug)
                } else {
                    "<h2 class=\"tha__title2\">No ids here</h2>".to_string()
                };
                if seed.with_main_image {
                    body.push_str(&format!(
                        r#"<img class="gal__mainImage" data-src="/img/{}.jpg">"#,
                        slug
                    ));
                }
                body.push_str(&links_html(&seed.related));
                return html(&body);
            }
        }

        if let Some(slug) = path.strip_prefix("/trends/") {
            if self.incomplete_articles.contains(slug) {
                return html("<p>Nothing to see</p>");
            }
            return html(&article_html(slug));
        }

        if let Some(slug) = path
            .strip_prefix("/img/")
            .and_then(|name| name.strip_suffix(".jpg"))
        {
            if self.missing_images.contains(slug) {
                return ResponseTemplate::new(404);
            }
            return ResponseTemplate::new(200).set_body_bytes(image_bytes(slug));
        }

        ResponseTemplate::new(404)
    }
}

pub fn param(request: &Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

pub fn links_html(slugs: &[String]) -> String {
    slugs
        .iter()
        .map(|slug| {
            format!(
                r#"<a class="thar" href="/trends/{0}"><img data-src="/img/{0}.jpg"></a>"#,
                slug
            )
        })
        .collect()
}

pub fn article_html(slug: &str) -> String {
    format!(
        r#"<div class="th__article" data-eid="e-{0}" data-cid="c-{0}">
            <h2 class="tha__title2">Title {0}</h2>
            <div class="tha__articleText">Description {0}</div>
        </div>"#,
        slug
    )
}

pub fn image_bytes(slug: &str) -> Vec<u8> {
    format!("jpeg:{}", slug).into_bytes()
}

/// Returns a config pointing at the mock server
pub fn config_for(server: &MockServer, count: usize, chunk_size: usize) -> Config {
    let mut config = Config {
        site: SiteConfig {
            base_url: server.uri(),
        },
        ..Config::default()
    };
    config.harvest.count = count;
    config.harvest.chunk_size = chunk_size;
    config.http.timeout_secs = 5;
    config
}

/// Returns the slugs `prefix0..prefix{n}`
pub fn slugs(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{}{}", prefix, i)).collect()
}
