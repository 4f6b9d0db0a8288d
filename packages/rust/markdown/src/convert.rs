//! HTML-to-Markdown conversion for crawled documentation pages.
//!
//! Unlike a reader-mode extractor, this keeps the site navigation: the
//! processing passes rely on the `User Manual` marker it carries and strip
//! the rest themselves.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

use pinedocs_shared::{PineDocsError, Result};

/// Tags whose content never reaches the Markdown output.
const SKIPPED_TAGS: [&str; 6] = ["script", "style", "iframe", "noscript", "svg", "head"];

/// Convert a full HTML page to Markdown.
///
/// 1. Selects `<body>` (falls back to the whole input)
/// 2. Converts HTML → Markdown via `htmd`
/// 3. Collapses blank-line runs and trailing whitespace
#[instrument(skip_all, fields(html_len = html.len()))]
pub fn html_to_markdown(html: &str) -> Result<String> {
    let body_html = extract_body_html(html);

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(SKIPPED_TAGS.to_vec())
        .build();

    let raw_markdown = converter
        .convert(&body_html)
        .map_err(|e| PineDocsError::Conversion(format!("htmd conversion failed: {e}")))?;

    let markdown = ensure_trailing_newline(&trim_line_ends(&collapse_blank_lines(
        &raw_markdown,
    )));

    debug!(raw_len = raw_markdown.len(), final_len = markdown.len(), "conversion complete");
    Ok(markdown)
}

/// Inner HTML of `<body>`, or the input unchanged when there is none.
fn extract_body_html(html: &str) -> String {
    let doc = Html::parse_document(html);

    if let Ok(body_sel) = Selector::parse("body") {
        if let Some(body) = doc.select(&body_sel).next() {
            return body.inner_html();
        }
    }

    html.to_string()
}

/// Collapse runs of 3+ blank lines into exactly 2.
fn collapse_blank_lines(md: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{4,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(md, "\n\n\n").into_owned()
}

fn trim_line_ends(md: &str) -> String {
    md.lines().map(str::trim_end).collect::<Vec<_>>().join("\n")
}

/// Ensure the text ends with exactly one newline.
fn ensure_trailing_newline(md: &str) -> String {
    let trimmed = md.trim_end_matches('\n');
    format!("{trimmed}\n")
}
