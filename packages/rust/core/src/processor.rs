//! Per-file processing of a directory of downloaded documentation pages.
//!
//! Files are handled one at a time: read, run through the text passes,
//! written to `<output_dir>/processed_<name>`. Each call returns its outcome
//! and [`DocProcessor::process_all`] collects them in order before handing
//! the written files to the combiner.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use pinedocs_markdown::{Outcome, SkipReason, normalize_newlines, process_text};
use pinedocs_shared::{
    InputDocument, PineDocsError, ProcessedFile, RESERVED_INPUT_NAME, Result,
};

use crate::combiner;

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting processing status.
pub trait ProgressReporter: Send + Sync {
    /// Called once the input directory has been listed (all entry names).
    fn listing(&self, input_dir: &Path, entries: &[String]);
    /// Called before a candidate file is read.
    fn processing(&self, filename: &str);
    /// Called after a processed file has been written.
    fn processed(&self, file: &ProcessedFile);
    /// Called when a file produced no output.
    fn skipped(&self, filename: &str, reason: SkipReason);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn listing(&self, _input_dir: &Path, _entries: &[String]) {}
    fn processing(&self, _filename: &str) {}
    fn processed(&self, _file: &ProcessedFile) {}
    fn skipped(&self, _filename: &str, _reason: SkipReason) {}
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of processing a single input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Written(ProcessedFile),
    Skipped(SkipReason),
}

/// Summary of a full directory run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Files written, in processing order.
    pub processed: Vec<ProcessedFile>,
    /// Files that produced no output.
    pub skipped: Vec<(String, SkipReason)>,
    /// Path of the combined output.
    pub combined_path: PathBuf,
}

// ---------------------------------------------------------------------------
// DocProcessor
// ---------------------------------------------------------------------------

/// Cleans every markdown page in an input directory.
#[derive(Debug, Clone)]
pub struct DocProcessor {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl DocProcessor {
    /// Create a processor writing into `<input_dir>/<output_subdir>`.
    ///
    /// The input directory must exist; the output directory is created if
    /// it does not.
    pub fn new(input_dir: impl Into<PathBuf>, output_subdir: &str) -> Result<Self> {
        let input_dir = input_dir.into();
        std::fs::read_dir(&input_dir).map_err(|e| PineDocsError::io(&input_dir, e))?;

        let output_dir = input_dir.join(output_subdir);

        std::fs::create_dir_all(&output_dir).map_err(|e| PineDocsError::io(&output_dir, e))?;

        Ok(Self {
            input_dir,
            output_dir,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// List candidate input files, sorted by name.
    ///
    /// Every entry name is reported to `progress`; only `*.md` files other
    /// than the reserved combined crawl file are returned. Symlinks are
    /// followed, so a link to a page counts as that page.
    pub fn list_inputs(&self, progress: &dyn ProgressReporter) -> Result<Vec<String>> {
        let read_dir = std::fs::read_dir(&self.input_dir)
            .map_err(|e| PineDocsError::io(&self.input_dir, e))?;

        let mut entries = Vec::new();
        let mut candidates = Vec::new();

        for entry in read_dir {
            let entry = entry.map_err(|e| PineDocsError::io(&self.input_dir, e))?;
            let Ok(name) = entry.file_name().into_string() else {
                warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
                continue;
            };

            let path = entry.path();
            let is_file = std::fs::metadata(&path)
                .map_err(|e| PineDocsError::io(&path, e))?
                .is_file();

            if is_file && is_candidate(&name) {
                candidates.push(name.clone());
            }
            entries.push(name);
        }

        entries.sort();
        candidates.sort();

        progress.listing(&self.input_dir, &entries);
        debug!(entries = entries.len(), candidates = candidates.len(), "input directory listed");

        Ok(candidates)
    }

    /// Process one input file, writing its output when anything is kept.
    #[instrument(skip(self))]
    pub fn process_file(&self, filename: &str) -> Result<FileOutcome> {
        let input_path = self.input_dir.join(filename);
        let raw = std::fs::read_to_string(&input_path)
            .map_err(|e| PineDocsError::io(&input_path, e))?;

        let input = InputDocument {
            filename: filename.to_string(),
            content: normalize_newlines(&raw),
        };

        let doc = match process_text(&input.content) {
            Outcome::Kept(doc) => doc,
            Outcome::Skipped(reason) => {
                debug!(%reason, "no output for file");
                return Ok(FileOutcome::Skipped(reason));
            }
        };

        let output_name = input.output_name();
        let output_path = self.output_dir.join(&output_name);
        std::fs::write(&output_path, doc.render())
            .map_err(|e| PineDocsError::io(&output_path, e))?;

        info!(output = %output_path.display(), fragments = doc.fragments.len(), "processed file written");

        Ok(FileOutcome::Written(ProcessedFile {
            output_name,
            output_path,
        }))
    }

    /// Process every candidate file, then write the combined output.
    ///
    /// The first I/O error aborts the run.
    #[instrument(skip_all, fields(input_dir = %self.input_dir.display()))]
    pub fn process_all(&self, progress: &dyn ProgressReporter) -> Result<RunSummary> {
        let candidates = self.list_inputs(progress)?;

        let mut processed = Vec::new();
        let mut skipped = Vec::new();

        for filename in candidates {
            progress.processing(&filename);

            match self.process_file(&filename)? {
                FileOutcome::Written(file) => {
                    progress.processed(&file);
                    processed.push(file);
                }
                FileOutcome::Skipped(reason) => {
                    progress.skipped(&filename, reason);
                    skipped.push((filename, reason));
                }
            }
        }

        let combined_path = combiner::combine(&self.output_dir, &processed)?;

        info!(
            processed = processed.len(),
            skipped = skipped.len(),
            combined = %combined_path.display(),
            "run complete"
        );

        Ok(RunSummary {
            processed,
            skipped,
            combined_path,
        })
    }
}

/// Whether a directory entry name is a page to process.
pub fn is_candidate(name: &str) -> bool {
    name.ends_with(".md") && name != RESERVED_INPUT_NAME
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use pinedocs_shared::COMBINED_OUTPUT_NAME;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("pinedocs-proc-test-{}", uuid::Uuid::now_v7()))
    }

    fn real_page(body: &str) -> String {
        format!("User Manual\n{body}\n{}\n", "Padding text. ".repeat(10))
    }

    fn write_input(dir: &Path, name: &str, content: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(name), content).unwrap();
    }

    /// Records every progress event as a line.
    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn listing(&self, _input_dir: &Path, entries: &[String]) {
            self.events.lock().unwrap().push(format!("list {}", entries.join(",")));
        }
        fn processing(&self, filename: &str) {
            self.events.lock().unwrap().push(format!("processing {filename}"));
        }
        fn processed(&self, file: &ProcessedFile) {
            self.events.lock().unwrap().push(format!("ok {}", file.output_name));
        }
        fn skipped(&self, filename: &str, _reason: SkipReason) {
            self.events.lock().unwrap().push(format!("skip {filename}"));
        }
    }

    #[test]
    fn candidate_filter() {
        assert!(is_candidate("a.md"));
        assert!(!is_candidate("all_docs.md"));
        assert!(!is_candidate("notes.txt"));
        assert!(!is_candidate("md"));
    }

    #[test]
    fn new_creates_output_dir() {
        let tmp = temp_dir();
        std::fs::create_dir_all(&tmp).unwrap();

        let processor = DocProcessor::new(&tmp, "processed").unwrap();
        assert!(processor.output_dir().is_dir());
        assert_eq!(processor.output_dir(), tmp.join("processed"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn new_requires_input_dir() {
        let tmp = temp_dir();
        let err = DocProcessor::new(&tmp, "processed").unwrap_err();
        assert!(matches!(err, PineDocsError::Io { .. }));
        assert!(!tmp.exists());
    }

    #[test]
    fn list_inputs_filters_and_sorts() {
        let tmp = temp_dir();
        write_input(&tmp, "c.md", "x");
        write_input(&tmp, "a.md", "x");
        write_input(&tmp, "all_docs.md", "x");
        write_input(&tmp, "readme.txt", "x");
        std::fs::create_dir_all(tmp.join("folder.md")).unwrap();

        let processor = DocProcessor::new(&tmp, "processed").unwrap();
        let inputs = processor.list_inputs(&SilentProgress).unwrap();
        assert_eq!(inputs, vec!["a.md", "c.md"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[cfg(unix)]
    #[test]
    fn list_inputs_follows_symlinked_pages() {
        let tmp = temp_dir();
        let pages = temp_dir();
        write_input(&pages, "variables.md", &real_page("## [Intro]\nPine Script basics."));
        std::fs::create_dir_all(&tmp).unwrap();
        std::os::unix::fs::symlink(pages.join("variables.md"), tmp.join("a.md")).unwrap();
        std::os::unix::fs::symlink(&pages, tmp.join("linked_dir.md")).unwrap();

        let processor = DocProcessor::new(&tmp, "processed").unwrap();
        assert_eq!(processor.list_inputs(&SilentProgress).unwrap(), vec!["a.md"]);

        let outcome = processor.process_file("a.md").unwrap();
        assert!(matches!(outcome, FileOutcome::Written(_)));

        let _ = std::fs::remove_dir_all(&tmp);
        let _ = std::fs::remove_dir_all(&pages);
    }

    #[test]
    fn crlf_page_is_gated_after_normalization() {
        let tmp = temp_dir();
        // Long enough only while its line endings are CRLF.
        write_input(&tmp, "b.md", &format!("User Manual\r\n{}", "abcdef\r\n".repeat(11)));

        let processor = DocProcessor::new(&tmp, "processed").unwrap();
        let outcome = processor.process_file("b.md").unwrap();
        assert_eq!(outcome, FileOutcome::Skipped(SkipReason::TooShort));
        assert!(!tmp.join("processed/processed_b.md").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn crlf_page_output_has_no_carriage_returns() {
        let tmp = temp_dir();
        let page = real_page("## [Intro]\nPine Script basics.\n@function f\n@returns x\n")
            .replace('\n', "\r\n");
        write_input(&tmp, "a.md", &page);

        let processor = DocProcessor::new(&tmp, "processed").unwrap();
        let FileOutcome::Written(file) = processor.process_file("a.md").unwrap() else {
            panic!("a.md should be written");
        };

        let written = std::fs::read_to_string(&file.output_path).unwrap();
        assert!(!written.contains('\r'));
        assert!(written.contains("@function f\n@returns x\n"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn process_file_writes_prefixed_output() {
        let tmp = temp_dir();
        let page = real_page(
            "## [Intro]\nThis covers Pine Script functions.\n\n```pine\nplot(close)\n```",
        );
        write_input(&tmp, "a.md", &page);

        let processor = DocProcessor::new(&tmp, "processed").unwrap();
        let outcome = processor.process_file("a.md").unwrap();

        let FileOutcome::Written(file) = outcome else {
            panic!("a.md should be written");
        };
        assert_eq!(file.output_name, "processed_a.md");

        let written = std::fs::read_to_string(tmp.join("processed/processed_a.md")).unwrap();
        assert!(written.starts_with("## Intro\nThis covers Pine Script functions."));
        assert!(written.contains("## Code Examples"));
        assert!(written.contains("```pine\nplot(close)\n```"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn short_file_produces_no_output() {
        let tmp = temp_dir();
        write_input(&tmp, "b.md", "User Manual\ntoo short");

        let processor = DocProcessor::new(&tmp, "processed").unwrap();
        let outcome = processor.process_file("b.md").unwrap();

        assert_eq!(outcome, FileOutcome::Skipped(SkipReason::TooShort));
        assert!(!tmp.join("processed/processed_b.md").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let tmp = temp_dir();
        std::fs::create_dir_all(&tmp).unwrap();

        let processor = DocProcessor::new(&tmp, "processed").unwrap();
        let err = processor.process_file("nope.md").unwrap_err();
        assert!(matches!(err, PineDocsError::Io { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn invalid_utf8_aborts() {
        let tmp = temp_dir();
        std::fs::create_dir_all(&tmp).unwrap();
        std::fs::write(tmp.join("bad.md"), [0xff, 0xfe, 0x00]).unwrap();

        let processor = DocProcessor::new(&tmp, "processed").unwrap();
        assert!(processor.process_all(&SilentProgress).is_err());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn process_all_reports_and_combines() {
        let tmp = temp_dir();
        write_input(&tmp, "c.md", &real_page("## [Values]\nA value holds data."));
        write_input(&tmp, "b.md", "short");
        write_input(&tmp, "a.md", &real_page("## [Intro]\nPine Script basics."));
        write_input(&tmp, "all_docs.md", &real_page("## [All]\nPine everything."));

        let processor = DocProcessor::new(&tmp, "processed").unwrap();
        let progress = RecordingProgress::default();
        let summary = processor.process_all(&progress).unwrap();

        let names: Vec<&str> = summary.processed.iter().map(|f| f.output_name.as_str()).collect();
        assert_eq!(names, vec!["processed_a.md", "processed_c.md"]);
        assert_eq!(summary.skipped, vec![("b.md".to_string(), SkipReason::TooShort)]);
        assert_eq!(summary.combined_path, tmp.join("processed").join(COMBINED_OUTPUT_NAME));

        let events = progress.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "list a.md,all_docs.md,b.md,c.md,processed",
                "processing a.md",
                "ok processed_a.md",
                "processing b.md",
                "skip b.md",
                "processing c.md",
                "ok processed_c.md",
            ]
        );

        let combined = std::fs::read_to_string(&summary.combined_path).unwrap();
        assert!(!combined.contains("processed_b"));
        assert!(!combined.contains("Pine everything"));
        let a_pos = combined.find("# processed_a\n").unwrap();
        let c_pos = combined.find("# processed_c\n").unwrap();
        assert!(a_pos < c_pos);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rerun_ignores_previous_outputs() {
        let tmp = temp_dir();
        write_input(&tmp, "a.md", &real_page("## [Intro]\nPine Script basics."));

        let processor = DocProcessor::new(&tmp, "processed").unwrap();
        let first = processor.process_all(&SilentProgress).unwrap();
        let second = processor.process_all(&SilentProgress).unwrap();

        assert_eq!(first.processed, second.processed);
        assert_eq!(
            std::fs::read_to_string(&first.combined_path).unwrap(),
            std::fs::read_to_string(&second.combined_path).unwrap()
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
