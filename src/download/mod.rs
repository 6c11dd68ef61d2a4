//! PDF retrieval for resolved records.
//!
//! [`DownloadManager`] decides whether a fetch is needed, picks between a
//! streamed [`HttpClient`] request and a [`SegmentedDownloader`], and moves the
//! finished `.part` file to its final name.
//!
//! # Example
//!
//! ```no_run
//! use paperdl_core::download::{DownloadManager, HttpClient};
//! use paperdl_core::http::HttpSettings;
//! use paperdl_core::resolve;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let record = resolve("https://openaccess.thecvf.com/content_cvpr_2015/html/Szegedy_Going_Deeper_With_2015_CVPR_paper.html")?;
//! let manager = DownloadManager::new(HttpClient::new(&HttpSettings::download_defaults())?);
//! let outcome = manager.download(&record, Path::new("./papers"), 5).await?;
//! println!("{}", outcome.path().display());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod manager;
mod segmented;

pub use client::HttpClient;
pub use constants::{DEFAULT_PARALLELISM, MAX_PARALLELISM};
pub use error::DownloadError;
pub use manager::{DownloadManager, DownloadOutcome, DownloadStrategy};
pub use segmented::{Aria2Downloader, SegmentedDownloader};
