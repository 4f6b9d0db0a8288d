//! Core orchestration for pinedocs.
//!
//! This crate ties the text passes and the crawler to the filesystem:
//! - [`processor`]: cleans every page in an input directory
//! - [`combiner`]: concatenates the per-file outputs
//! - [`pipeline`]: crawls a docs site into an input directory

pub mod combiner;
pub mod pipeline;
pub mod processor;

pub use pipeline::{CrawlProgress, CrawlSummary, SilentCrawl, crawl_docs};
pub use processor::{DocProcessor, FileOutcome, ProgressReporter, RunSummary, SilentProgress};
