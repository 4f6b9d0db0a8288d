//! Text passes that turn a downloaded documentation page into a trimmed one.
//!
//! The per-page pipeline is:
//! 1. Content gate ([`check_content`])
//! 2. Boilerplate removal ([`strip_boilerplate`])
//! 3. Extraction of code blocks, function docs and keyword sections
//! 4. Assembly into a [`ProcessedDocument`] ([`assemble`])
//!
//! [`html_to_markdown`] is used by the crawler to produce the pages in the
//! first place; the passes above never look at HTML.

mod cleanup;
mod convert;
mod extract;

use tracing::debug;

use pinedocs_shared::{ProcessedDocument, Section};

pub use cleanup::{clean_section_body, strip_boilerplate};
pub use convert::html_to_markdown;
pub use extract::{
    SECTION_KEYWORDS, extract_code_blocks, extract_function_docs, extract_sections,
    filter_sections, is_relevant_section,
};

/// Pages shorter than this (in characters) are not real content.
pub const MIN_CONTENT_CHARS: usize = 100;

/// Substring every real documentation page carries.
pub const CONTENT_MARKER: &str = "User Manual";

const CODE_EXAMPLES_HEADING: &str = "\n## Code Examples\n";
const FUNCTION_DOCS_HEADING: &str = "\n## Function Documentation\n";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Why a page produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than [`MIN_CONTENT_CHARS`] characters.
    TooShort,
    /// [`CONTENT_MARKER`] not found.
    MissingMarker,
    /// Nothing survived extraction.
    NoContent,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TooShort => "too short",
            Self::MissingMarker => "missing marker",
            Self::NoContent => "no extractable content",
        };
        f.write_str(s)
    }
}

/// Result of running the text passes over one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Kept(ProcessedDocument),
    Skipped(SkipReason),
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Convert `\r\n` and lone `\r` line endings to `\n`.
///
/// Pages are read as text, so the gate and every pattern only ever see `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Decide whether raw page text is worth processing.
pub fn check_content(text: &str) -> Option<SkipReason> {
    if text.chars().count() < MIN_CONTENT_CHARS {
        Some(SkipReason::TooShort)
    } else if !text.contains(CONTENT_MARKER) {
        Some(SkipReason::MissingMarker)
    } else {
        None
    }
}

/// Run every pass over one page.
pub fn process_text(text: &str) -> Outcome {
    if let Some(reason) = check_content(text) {
        return Outcome::Skipped(reason);
    }

    let cleaned = strip_boilerplate(text);

    let code_blocks = extract_code_blocks(&cleaned);
    let function_docs = extract_function_docs(&cleaned);
    let sections = filter_sections(extract_sections(&cleaned));

    debug!(
        sections = sections.len(),
        code_blocks = code_blocks.len(),
        function_docs = function_docs.len(),
        "extraction complete"
    );

    let doc = assemble(&sections, &code_blocks, &function_docs);
    if doc.is_empty() {
        Outcome::Skipped(SkipReason::NoContent)
    } else {
        Outcome::Kept(doc)
    }
}

/// Order the kept pieces: sections, then code examples, then function docs.
///
/// The group headings are only emitted when their group is non-empty.
pub fn assemble(
    sections: &[Section],
    code_blocks: &[String],
    function_docs: &[String],
) -> ProcessedDocument {
    let mut fragments: Vec<String> = sections
        .iter()
        .map(|s| format!("## {}\n{}", s.title, s.body))
        .collect();

    if !code_blocks.is_empty() {
        fragments.push(CODE_EXAMPLES_HEADING.to_string());
        fragments.extend(code_blocks.iter().cloned());
    }

    if !function_docs.is_empty() {
        fragments.push(FUNCTION_DOCS_HEADING.to_string());
        fragments.extend(function_docs.iter().cloned());
    }

    ProcessedDocument { fragments }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
