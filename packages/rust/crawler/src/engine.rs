//! Batched documentation crawler.
//!
//! Reads the navigation of a docs site's start page to learn every page URL,
//! then fetches pages in small sequential batches with a pause between
//! batches.

use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use pinedocs_shared::{CrawlConfig, PineDocsError, Result};

/// User-Agent string for crawl requests.
const USER_AGENT: &str = concat!("pinedocs/", env!("CARGO_PKG_VERSION"));

/// Containers whose links make up the documentation tree.
const NAV_LINK_SELECTOR: &str =
    "nav.toc a[href], nav.sidebar a[href], div.toc a[href], div.sidebar a[href]";

// ---------------------------------------------------------------------------
// DocsCrawler
// ---------------------------------------------------------------------------

/// Fetches documentation pages that live under one base URL.
pub struct DocsCrawler {
    config: CrawlConfig,
    client: Client,
    base: Url,
}

impl DocsCrawler {
    /// Create a new crawler with the given configuration.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        config.validate()?;

        let base = Url::parse(&config.base_url)
            .map_err(|e| PineDocsError::parse(format!("invalid base URL: {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PineDocsError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            base,
        })
    }

    /// Collect every documentation URL linked from the start page navigation.
    ///
    /// Returns the de-duplicated URLs in sorted order. A start page that
    /// cannot be fetched yields an empty list rather than an error.
    #[instrument(skip_all, fields(start = %self.config.start_url()))]
    pub async fn collect_doc_urls(&self) -> Result<Vec<Url>> {
        let start_url = self.config.start_url();

        let html = match self.fetch(&start_url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "failed to access start page");
                return Ok(Vec::new());
            }
        };

        let doc = Html::parse_document(&html);
        let urls = extract_nav_links(&doc, &self.config.base_url, &self.base);

        info!(count = urls.len(), "documentation URLs collected");
        Ok(urls.into_iter().collect())
    }

    /// Fetch a page body as text.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PineDocsError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PineDocsError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| PineDocsError::Network(format!("{url}: body read failed: {e}")))
    }

    /// Fetch `urls` in batches of `batch_size`, pausing between batches.
    ///
    /// Every fetch result, success or failure, is handed to `on_page` in
    /// input order. An error returned by `on_page` stops the crawl.
    #[instrument(skip_all, fields(pages = urls.len(), batch_size = self.config.batch_size))]
    pub async fn fetch_batched<F>(&self, urls: &[Url], mut on_page: F) -> Result<()>
    where
        F: FnMut(&Url, Result<String>) -> Result<()>,
    {
        let batch_count = urls.len().div_ceil(self.config.batch_size);
        let delay = Duration::from_millis(self.config.batch_delay_ms);

        for (index, batch) in urls.chunks(self.config.batch_size).enumerate() {
            info!(batch = index + 1, of = batch_count, "processing batch");

            for url in batch {
                let result = self.fetch(url.as_str()).await;
                if let Err(e) = &result {
                    warn!(%url, error = %e, "fetch failed");
                }
                on_page(url, result)?;
            }

            if index + 1 < batch_count && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Link handling
// ---------------------------------------------------------------------------

/// Collect normalized links from the navigation containers of a page.
fn extract_nav_links(doc: &Html, base_str: &str, base: &Url) -> BTreeSet<Url> {
    let Ok(link_sel) = Selector::parse(NAV_LINK_SELECTOR) else {
        return BTreeSet::new();
    };

    doc.select(&link_sel)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| normalize_doc_url(href, base_str, base))
        .collect()
}

/// Turn a navigation `href` into an absolute documentation URL.
///
/// Fragments and query strings are dropped. Links that leave the docs site
/// or use a non-navigational scheme are rejected.
pub fn normalize_doc_url(href: &str, base_str: &str, base: &Url) -> Option<Url> {
    let href = href.split('#').next().unwrap_or_default();
    let href = href.split('?').next().unwrap_or_default();

    if href.is_empty() {
        return None;
    }
    if href.starts_with("http") && !href.starts_with(base_str) {
        return None;
    }
    if href.starts_with("mailto:") || href.starts_with("tel:") || href.starts_with("javascript:")
    {
        return None;
    }

    let absolute = if href.starts_with("http") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{href}", base.origin().ascii_serialization())
    } else {
        format!("{}/{href}", base_str.trim_end_matches('/'))
    };

    Url::parse(&absolute).ok()
}

/// Short page name: the last non-empty path segment, or `index`.
pub fn page_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .unwrap_or_else(|| "index".to_string())
}
