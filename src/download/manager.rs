//! Download orchestration for one record: skip check, strategy choice and
//! the `.part` rename.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::client::HttpClient;
use super::constants::{ARIA2_CONTROL_SUFFIX, MAX_PARALLELISM, PART_SUFFIX};
use super::error::DownloadError;
use super::segmented::{Aria2Downloader, SegmentedDownloader};
use crate::record::{PaperRecord, SourceWebsite};

/// How a file was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStrategy {
    /// Single streamed HTTP request.
    Streamed,
    /// External multi-connection program.
    Segmented,
}

impl fmt::Display for DownloadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Streamed => f.write_str("streamed"),
            Self::Segmented => f.write_str("segmented"),
        }
    }
}

/// Result of a successful download call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The destination already existed; nothing was fetched.
    Skipped(PathBuf),
    /// The file was fetched and moved into place.
    Downloaded {
        path: PathBuf,
        strategy: DownloadStrategy,
    },
}

impl DownloadOutcome {
    /// Final path of the PDF.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Skipped(path) | Self::Downloaded { path, .. } => path,
        }
    }
}

/// Fetches PDFs for resolved records.
pub struct DownloadManager {
    http: HttpClient,
    segmented: Option<Box<dyn SegmentedDownloader>>,
}

impl DownloadManager {
    /// Streams over `http` and uses `aria2c` when it is installed.
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        let segmented = Aria2Downloader::locate().map(|aria2| {
            debug!(program = aria2.name(), "segmented downloader available");
            Box::new(aria2) as Box<dyn SegmentedDownloader>
        });
        Self::with_segmented(http, segmented)
    }

    /// Streams over `http` only.
    #[must_use]
    pub fn streamed_only(http: HttpClient) -> Self {
        Self::with_segmented(http, None)
    }

    /// Uses the given segmented downloader, if any.
    #[must_use]
    pub fn with_segmented(http: HttpClient, segmented: Option<Box<dyn SegmentedDownloader>>) -> Self {
        Self { http, segmented }
    }

    /// Downloads `record.pdf_url` to `dest_dir/record.download_name`.
    ///
    /// An existing destination file is left untouched and reported as
    /// [`DownloadOutcome::Skipped`]. Data is written to `NAME.part` and renamed
    /// only after the fetch succeeds, so the final name never holds a partial
    /// file. CVF records always use one connection.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidParallelism`] for counts outside
    /// `1..=16`, [`DownloadError::MissingField`] when the record has no file
    /// name or PDF URL, and fetch or IO errors otherwise.
    #[instrument(skip(self, record), fields(paper_id = %record.paper_id, dest_dir = %dest_dir.display()))]
    pub async fn download(
        &self,
        record: &PaperRecord,
        dest_dir: &Path,
        parallelism: usize,
    ) -> Result<DownloadOutcome, DownloadError> {
        if !(1..=MAX_PARALLELISM).contains(&parallelism) {
            return Err(DownloadError::InvalidParallelism {
                requested: parallelism,
            });
        }
        let file_name = record
            .download_name
            .as_deref()
            .ok_or_else(|| DownloadError::missing_field(&record.paper_id, "download_name"))?;
        let url = record
            .pdf_url
            .as_deref()
            .ok_or_else(|| DownloadError::missing_field(&record.paper_id, "pdf_url"))?;

        let final_path = dest_dir.join(file_name);
        let exists = tokio::fs::try_exists(&final_path)
            .await
            .map_err(|e| DownloadError::io(&final_path, e))?;
        if exists {
            info!(path = %final_path.display(), "already downloaded, skipping");
            return Ok(DownloadOutcome::Skipped(final_path));
        }

        let connections = if record.src_website == SourceWebsite::Cvf && parallelism > 1 {
            debug!(requested = parallelism, "CVF downloads use a single connection");
            1
        } else {
            parallelism
        };

        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| DownloadError::io(dest_dir, e))?;

        let part_name = format!("{file_name}{PART_SUFFIX}");
        let part_path = dest_dir.join(&part_name);
        let segmented = self
            .segmented
            .as_deref()
            .filter(|downloader| connections > 1 && downloader.is_available());
        let strategy = if segmented.is_some() {
            DownloadStrategy::Segmented
        } else {
            DownloadStrategy::Streamed
        };
        debug!(%strategy, connections, url, "starting fetch");

        let fetched = match segmented {
            Some(downloader) => downloader.fetch(url, dest_dir, &part_name, connections).await,
            None => self.http.download_to_path(url, &part_path).await.map(|_| ()),
        };
        let finished = match fetched {
            Ok(()) => tokio::fs::rename(&part_path, &final_path)
                .await
                .map_err(|e| DownloadError::io(&final_path, e)),
            Err(error) => Err(error),
        };

        if let Err(error) = finished {
            warn!(error = %error, "download failed, removing partial files");
            remove_partial_files(&part_path).await;
            return Err(error);
        }

        info!(path = %final_path.display(), %strategy, "download complete");
        Ok(DownloadOutcome::Downloaded {
            path: final_path,
            strategy,
        })
    }
}

impl fmt::Debug for DownloadManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadManager")
            .field("http", &self.http)
            .field("segmented", &self.segmented.as_ref().map(|s| s.name()))
            .finish()
    }
}

async fn remove_partial_files(part_path: &Path) {
    let mut control = part_path.as_os_str().to_owned();
    control.push(ARIA2_CONTROL_SUFFIX);
    for path in [part_path.to_path_buf(), PathBuf::from(control)] {
        if tokio::fs::remove_file(&path).await.is_ok() {
            debug!(path = %path.display(), "removed partial file");
        }
    }
}
