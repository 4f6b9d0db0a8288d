//! Documentation site crawler.
//!
//! This crate provides:
//! - [`DocsCrawler`]: navigation-driven URL discovery and batched page fetching
//! - [`normalize_doc_url`] / [`page_name`]: helpers for turning links into
//!   stable URLs and short page names

pub mod engine;

pub use engine::{DocsCrawler, normalize_doc_url, page_name};
