//! Combined output writer.
//!
//! Re-reads every per-file output written during the run and concatenates
//! them into `processed_all_docs.md`, each under a `# <name>` header and
//! followed by a horizontal rule.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use pinedocs_shared::{COMBINED_OUTPUT_NAME, PineDocsError, ProcessedFile, Result};

/// Write the combined output for `files`, in the given order.
///
/// The file is always written, even when `files` is empty. The content is
/// staged in a temp file and renamed into place.
#[instrument(skip_all, fields(output_dir = %output_dir.display(), files = files.len()))]
pub fn combine(output_dir: &Path, files: &[ProcessedFile]) -> Result<PathBuf> {
    let mut combined = String::new();

    for file in files {
        let content = std::fs::read_to_string(&file.output_path)
            .map_err(|e| PineDocsError::io(&file.output_path, e))?;

        combined.push_str(&render_entry(file.stem(), &content));
        debug!(file = %file.output_name, len = content.len(), "appended to combined output");
    }

    let target = output_dir.join(COMBINED_OUTPUT_NAME);
    let temp = output_dir.join(format!(".{COMBINED_OUTPUT_NAME}.tmp"));

    std::fs::write(&temp, &combined).map_err(|e| PineDocsError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| PineDocsError::io(&target, e))?;

    Ok(target)
}

/// One header / content / rule block of the combined output.
fn render_entry(stem: &str, content: &str) -> String {
    format!("\n\n# {stem}\n\n{content}\n\n---\n\n")
}
