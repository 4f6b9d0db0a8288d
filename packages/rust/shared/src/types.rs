//! Core domain types for a documentation cleaning run.

use std::path::PathBuf;

/// Input file name that is never processed (it holds a combined crawl).
pub const RESERVED_INPUT_NAME: &str = "all_docs.md";

/// Name of the combined output written after every per-file pass.
pub const COMBINED_OUTPUT_NAME: &str = "processed_all_docs.md";

/// Prefix prepended to an input file name to form its output name.
pub const OUTPUT_PREFIX: &str = "processed_";

// ---------------------------------------------------------------------------
// InputDocument
// ---------------------------------------------------------------------------

/// A downloaded markdown page, read once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDocument {
    /// File name inside the input directory (e.g. `variables.md`).
    pub filename: String,
    /// Raw UTF-8 content.
    pub content: String,
}

impl InputDocument {
    /// Name of the processed file produced from this input.
    pub fn output_name(&self) -> String {
        format!("{OUTPUT_PREFIX}{}", self.filename)
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// A `## [title]` heading and the text that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub body: String,
}

// ---------------------------------------------------------------------------
// ProcessedDocument
// ---------------------------------------------------------------------------

/// Ordered text fragments kept from one input document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedDocument {
    pub fragments: Vec<String>,
}

impl ProcessedDocument {
    /// Whether nothing was kept.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Serialize to the on-disk form (fragments separated by a blank line).
    pub fn render(&self) -> String {
        self.fragments.join("\n\n")
    }
}

// ---------------------------------------------------------------------------
// ProcessedFile
// ---------------------------------------------------------------------------

/// A per-file output that was successfully written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    /// Output file name (`processed_<input name>`).
    pub output_name: String,
    /// Absolute or working-dir-relative path of the written file.
    pub output_path: PathBuf,
}

impl ProcessedFile {
    /// Output name without its `.md` extension, used as the combined-file header.
    pub fn stem(&self) -> &str {
        self.output_name
            .strip_suffix(".md")
            .unwrap_or(&self.output_name)
    }
}
