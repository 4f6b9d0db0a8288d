//! End-to-end `crawl` pipeline: docs site → navigation URLs → Markdown pages.
//!
//! Produces the input directory the processor consumes: one
//! `<page>_<timestamp>.md` per page, a combined `all_docs.md`, and a
//! `failed_urls_<timestamp>.txt` listing every page that could not be saved.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use tracing::{info, instrument, warn};
use url::Url;

use pinedocs_crawler::{DocsCrawler, page_name};
use pinedocs_markdown::html_to_markdown;
use pinedocs_shared::{CrawlConfig, PineDocsError, RESERVED_INPUT_NAME, Result};

/// Progress callback for reporting crawl status.
pub trait CrawlProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after a page has been saved.
    fn page_saved(&self, page: &str, current: usize, total: usize);
    /// Called when a page could not be fetched or converted.
    fn page_failed(&self, url: &str, error: &str);
}

/// No-op crawl reporter for headless/test usage.
pub struct SilentCrawl;

impl CrawlProgress for SilentCrawl {
    fn phase(&self, _name: &str) {}
    fn page_saved(&self, _page: &str, _current: usize, _total: usize) {}
    fn page_failed(&self, _url: &str, _error: &str) {}
}

/// Result of the `crawl` pipeline.
#[derive(Debug)]
pub struct CrawlSummary {
    /// Documentation URLs found in the navigation.
    pub pages_found: usize,
    /// Pages saved to disk.
    pub succeeded: usize,
    /// Pages that failed to fetch or convert.
    pub failed: usize,
    /// Combined crawl file (`None` when no URLs were found).
    pub combined_path: Option<PathBuf>,
    /// Failure log (`None` when no URLs were found).
    pub failed_path: Option<PathBuf>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Run the full crawl into `output_dir`.
#[instrument(skip_all, fields(base_url = %config.base_url, output_dir = %output_dir.display()))]
pub async fn crawl_docs(
    config: &CrawlConfig,
    output_dir: &Path,
    progress: &dyn CrawlProgress,
) -> Result<CrawlSummary> {
    let start = Instant::now();
    let crawler = DocsCrawler::new(config.clone())?;

    progress.phase("Collecting documentation URLs");
    let urls = crawler.collect_doc_urls().await?;

    if urls.is_empty() {
        warn!("no documentation pages found");
        return Ok(CrawlSummary {
            pages_found: 0,
            succeeded: 0,
            failed: 0,
            combined_path: None,
            failed_path: None,
            elapsed: start.elapsed(),
        });
    }

    std::fs::create_dir_all(output_dir).map_err(|e| PineDocsError::io(output_dir, e))?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let combined_path = output_dir.join(RESERVED_INPUT_NAME);
    let failed_path = output_dir.join(format!("failed_urls_{timestamp}.txt"));

    let mut sink = PageSink {
        output_dir,
        timestamp: &timestamp,
        combined: create_writer(&combined_path)?,
        failed: create_writer(&failed_path)?,
        combined_path: &combined_path,
        failed_path: &failed_path,
        succeeded: 0,
        failed_count: 0,
    };

    progress.phase("Crawling documentation pages");
    let total = urls.len();

    crawler
        .fetch_batched(&urls, |url, fetched| {
            let saved = fetched.and_then(|html| sink.save_page(url, &html));
            match saved {
                Ok(page) => {
                    progress.page_saved(&page, sink.succeeded + sink.failed_count, total);
                    Ok(())
                }
                Err(e @ PineDocsError::Io { .. }) => Err(e),
                Err(e) => {
                    let message = e.to_string();
                    progress.page_failed(url.as_str(), &message);
                    sink.record_failure(url, &message)
                }
            }
        })
        .await?;

    sink.finish()?;

    let summary = CrawlSummary {
        pages_found: total,
        succeeded: sink.succeeded,
        failed: sink.failed_count,
        combined_path: Some(combined_path.clone()),
        failed_path: Some(failed_path.clone()),
        elapsed: start.elapsed(),
    };

    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        elapsed_ms = summary.elapsed.as_millis(),
        "crawl completed"
    );

    Ok(summary)
}

// ---------------------------------------------------------------------------
// Page output
// ---------------------------------------------------------------------------

/// Writes fetched pages and failures as they arrive.
struct PageSink<'a> {
    output_dir: &'a Path,
    timestamp: &'a str,
    combined: BufWriter<File>,
    failed: BufWriter<File>,
    combined_path: &'a Path,
    failed_path: &'a Path,
    succeeded: usize,
    failed_count: usize,
}

impl PageSink<'_> {
    /// Convert and save one page; returns its page name.
    fn save_page(&mut self, url: &Url, html: &str) -> Result<String> {
        let markdown = html_to_markdown(html)?;
        let name = page_name(url);
        let entry = render_page(&name, url, &markdown);

        let page_path = self.output_dir.join(format!("{name}_{}.md", self.timestamp));
        std::fs::write(&page_path, &entry).map_err(|e| PineDocsError::io(&page_path, e))?;

        write!(self.combined, "\n\n{entry}\n\n---\n\n")
            .map_err(|e| PineDocsError::io(self.combined_path, e))?;

        self.succeeded += 1;
        info!(page = %name, path = %page_path.display(), "page saved");
        Ok(name)
    }

    fn record_failure(&mut self, url: &Url, message: &str) -> Result<()> {
        self.failed_count += 1;
        writeln!(self.failed, "{url}: {message}")
            .map_err(|e| PineDocsError::io(self.failed_path, e))
    }

    fn finish(&mut self) -> Result<()> {
        self.combined
            .flush()
            .map_err(|e| PineDocsError::io(self.combined_path, e))?;
        self.failed
            .flush()
            .map_err(|e| PineDocsError::io(self.failed_path, e))
    }
}

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| PineDocsError::io(path, e))
}

/// Page file layout: title, source line, converted Markdown.
fn render_page(name: &str, url: &Url, markdown: &str) -> String {
    format!("# {name}\n\nSource: {url}\n\n{markdown}")
}
