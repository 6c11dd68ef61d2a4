//! Paper Downloader Core Library
//!
//! This library turns a paper identifier or URL from arXiv, CVF open access or
//! ECVA into a normalized [`PaperRecord`], scrapes its descriptive metadata and
//! stores the PDF under a deterministic file name.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`validator`] - arXiv identifier grammar (modern and legacy)
//! - [`resolver`] - Offline target resolution into canonical abstract/PDF URLs
//! - [`scraper`] - Per-source abstract-page extraction and auxiliary lookups
//! - [`download`] - Streamed and segmented PDF retrieval with atomic rename
//! - [`library`] - Paper index, note files and embedded PDF metadata
//! - [`pipeline`] - Per-target orchestration of the stages above
//! - [`config`] - File configuration and download directory precedence
//! - [`http`] - Shared HTTP client policy and User-Agent strings

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod http;
pub mod library;
pub mod pipeline;
pub mod record;
pub mod resolver;
pub mod scraper;
pub mod validator;

// Re-export commonly used types
pub use download::{
    DEFAULT_PARALLELISM, DownloadError, DownloadManager, DownloadOutcome, DownloadStrategy,
    HttpClient, MAX_PARALLELISM,
};
pub use library::{LibraryError, PaperIndex};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineObserver, PipelineReport};
pub use record::{PaperRecord, SourceWebsite};
pub use resolver::{ResolveError, ResolverRegistry, resolve};
pub use scraper::{ScrapeError, ScraperRegistry, normalize_title};
pub use validator::{ArxivId, valid_arxiv_id};
