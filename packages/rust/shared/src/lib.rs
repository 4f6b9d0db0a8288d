//! Shared types, error model, and configuration for pinedocs.
//!
//! This crate is the foundation depended on by all other pinedocs crates.
//! It provides:
//! - [`PineDocsError`]: the unified error type
//! - Domain types ([`InputDocument`], [`ProcessedDocument`], [`Section`], [`ProcessedFile`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlConfig, CrawlSettings, PathsConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{PineDocsError, Result};
pub use types::{
    COMBINED_OUTPUT_NAME, InputDocument, OUTPUT_PREFIX, ProcessedDocument, ProcessedFile,
    RESERVED_INPUT_NAME, Section,
};
