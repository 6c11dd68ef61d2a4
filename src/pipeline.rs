//! Per-target orchestration.
//!
//! One target runs resolve → scrape → download → index → note → embed to
//! completion before the next one starts. All settings arrive through
//! [`PipelineConfig`]; console output is the caller's [`PipelineObserver`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::download::{DEFAULT_PARALLELISM, DownloadError, DownloadManager, DownloadOutcome};
use crate::library::{self, LibraryError, PaperIndex};
use crate::record::PaperRecord;
use crate::resolver::{ResolveError, ResolverRegistry};
use crate::scraper::{ScrapeError, ScraperRegistry};

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Directory receiving PDFs, the index and notes.
    pub download_dir: PathBuf,
    /// Requested download connections (`1..=16`).
    pub parallelism: usize,
    /// Skip the Markdown note.
    pub pdf_only: bool,
    /// Write scraped metadata into the PDF.
    pub embed_metadata: bool,
}

impl PipelineConfig {
    /// Defaults for `download_dir`: five connections, notes on, no embedding.
    #[must_use]
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            parallelism: DEFAULT_PARALLELISM,
            pdf_only: false,
            embed_metadata: false,
        }
    }
}

/// Errors that abort one target.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The PDF is on disk but the index or note could not be written.
    #[error(transparent)]
    Library(#[from] LibraryError),
}

/// Progress callbacks for one target. All methods default to no-ops.
pub trait PipelineObserver: Send + Sync {
    fn started(&self, _target: &str) {}
    fn resolved(&self, _record: &PaperRecord) {}
    fn scraped(&self, _record: &PaperRecord) {}
    fn downloaded(&self, _record: &PaperRecord, _outcome: &DownloadOutcome) {}
    fn failed(&self, _target: &str, _error: &PipelineError) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl PipelineObserver for SilentObserver {}

impl<T: PipelineObserver + ?Sized> PipelineObserver for Arc<T> {
    fn started(&self, target: &str) {
        (**self).started(target);
    }
    fn resolved(&self, record: &PaperRecord) {
        (**self).resolved(record);
    }
    fn scraped(&self, record: &PaperRecord) {
        (**self).scraped(record);
    }
    fn downloaded(&self, record: &PaperRecord, outcome: &DownloadOutcome) {
        (**self).downloaded(record, outcome);
    }
    fn failed(&self, target: &str, error: &PipelineError) {
        (**self).failed(target, error);
    }
}

/// What happened to one successfully processed target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub record: PaperRecord,
    /// `None` when no PDF link was found; the paper is still indexed.
    pub download: Option<DownloadOutcome>,
    /// True when the record was new to the index.
    pub indexed: bool,
    /// Note path when a new note was written.
    pub note_path: Option<PathBuf>,
    pub metadata_embedded: bool,
}

/// Resolve, scrape, download and file papers.
pub struct Pipeline {
    config: PipelineConfig,
    resolvers: ResolverRegistry,
    scrapers: ScraperRegistry,
    downloads: DownloadManager,
    observer: Box<dyn PipelineObserver>,
}

impl Pipeline {
    /// Creates a pipeline with the standard resolvers and a silent observer.
    #[must_use]
    pub fn new(config: PipelineConfig, scrapers: ScraperRegistry, downloads: DownloadManager) -> Self {
        Self {
            config,
            resolvers: ResolverRegistry::standard(),
            scrapers,
            downloads,
            observer: Box::new(SilentObserver),
        }
    }

    /// Replaces the resolver registry.
    #[must_use]
    pub fn with_resolvers(mut self, resolvers: ResolverRegistry) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Replaces the progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes one target end to end.
    ///
    /// # Errors
    ///
    /// Resolution and scrape failures abort before any file is written. A
    /// download failure aborts before the index is touched. A record that
    /// still has no PDF link after scraping is indexed and noted without a
    /// download. Index and note
    /// failures are reported after the PDF is in place. A metadata embedding
    /// failure is only logged.
    #[instrument(skip(self), fields(download_dir = %self.config.download_dir.display()))]
    pub async fn process(&self, target: &str) -> Result<PipelineReport, PipelineError> {
        self.observer.started(target);
        let result = self.run(target).await;
        match &result {
            Ok(report) => info!(paper_id = %report.record.paper_id, downloaded = report.download.is_some(), "target done"),
            Err(error) => {
                warn!(error = %error, "target failed");
                self.observer.failed(target, error);
            }
        }
        result
    }

    /// Processes targets one after another; a failure never stops the batch.
    pub async fn process_all<S: AsRef<str>>(
        &self,
        targets: &[S],
    ) -> Vec<(String, Result<PipelineReport, PipelineError>)> {
        let mut results = Vec::with_capacity(targets.len());
        for target in targets {
            let target = target.as_ref();
            results.push((target.to_string(), self.process(target).await));
        }
        results
    }

    async fn run(&self, target: &str) -> Result<PipelineReport, PipelineError> {
        let mut record = self.resolvers.resolve(target)?;
        self.observer.resolved(&record);

        if record.abs_url.is_some() {
            self.scrapers.scrape(&mut record).await?;
            self.observer.scraped(&record);
        } else {
            warn!(paper_id = %record.paper_id, "no abstract page for this URL; skipping metadata");
        }

        let dir = self.config.download_dir.as_path();
        let download = if record.pdf_url.is_some() {
            let outcome = self
                .downloads
                .download(&record, dir, self.config.parallelism)
                .await?;
            self.observer.downloaded(&record, &outcome);
            Some(outcome)
        } else {
            warn!(paper_id = %record.paper_id, "no PDF link found; indexing without a download");
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| LibraryError::io(dir, e))?;
            None
        };

        let indexed = PaperIndex::in_dir(dir).add(&record).await?;
        let note_path = if self.config.pdf_only {
            None
        } else {
            let (path, created) = library::write_note(&record, dir).await?;
            created.then_some(path)
        };
        let metadata_embedded = match &download {
            Some(outcome) if self.config.embed_metadata => {
                embed_in_background(outcome.path(), &record).await
            }
            _ => false,
        };

        Ok(PipelineReport {
            record,
            download,
            indexed,
            note_path,
            metadata_embedded,
        })
    }
}

/// Runs the blocking PDF rewrite off the async workers; failures are logged.
async fn embed_in_background(path: &Path, record: &PaperRecord) -> bool {
    let path = path.to_path_buf();
    let record = record.clone();
    let outcome =
        tokio::task::spawn_blocking(move || library::embed_metadata(&path, &record)).await;
    match outcome {
        Ok(Ok(())) => true,
        Ok(Err(error)) => {
            warn!(error = %error, "could not embed PDF metadata");
            false
        }
        Err(error) => {
            warn!(error = %error, "PDF metadata task failed");
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use reqwest::Client;
    use tempfile::TempDir;

    use crate::download::HttpClient;

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl PipelineObserver for RecordingObserver {
        fn started(&self, target: &str) {
            self.events.lock().unwrap().push(format!("started {target}"));
        }
        fn failed(&self, target: &str, _error: &PipelineError) {
            self.events.lock().unwrap().push(format!("failed {target}"));
        }
    }

    fn pipeline(dir: &Path) -> Pipeline {
        Pipeline::new(
            PipelineConfig::new(dir),
            ScraperRegistry::with_client(Client::new()),
            DownloadManager::streamed_only(HttpClient::from_client(Client::new())),
        )
    }

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::new("/tmp/papers");
        assert_eq!(config.parallelism, 5);
        assert!(!config.pdf_only);
        assert!(!config.embed_metadata);
    }

    #[tokio::test]
    async fn test_unresolvable_target_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let err = pipeline(dir.path())
            .process("https://example.com/paper")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Resolve(ResolveError::UnknownSource { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_process_all_continues_after_failures() {
        let dir = TempDir::new().unwrap();
        let observer = Arc::new(RecordingObserver::default());

        let pipeline = pipeline(dir.path()).with_observer(Box::new(Arc::clone(&observer)));
        let results = pipeline
            .process_all(["", "https://openreview.net/forum?id=abc"].as_slice())
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, result)| result.is_err()));
        assert!(matches!(
            results[1].1,
            Err(PipelineError::Resolve(ResolveError::UnsupportedSource { .. }))
        ));
        assert_eq!(
            *observer.events.lock().unwrap(),
            vec![
                "started ",
                "failed ",
                "started https://openreview.net/forum?id=abc",
                "failed https://openreview.net/forum?id=abc",
            ]
        );
    }
}
