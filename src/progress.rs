//! Console progress (spinner) for pipeline runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use paperdl_core::{DownloadOutcome, PaperRecord, PipelineError, PipelineObserver};

/// Spinner-backed observer. Without a spinner only failures are printed.
pub(crate) struct ConsoleObserver {
    spinner: Option<ProgressBar>,
    total: usize,
    current: AtomicUsize,
}

impl ConsoleObserver {
    pub(crate) fn new(use_spinner: bool, total: usize) -> Self {
        let spinner = use_spinner.then(|| {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        });
        Self {
            spinner,
            total,
            current: AtomicUsize::new(0),
        }
    }

    /// Clears the spinner line.
    pub(crate) fn finish(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }

    fn status(&self, message: &str) {
        if let Some(spinner) = &self.spinner {
            let current = self.current.load(Ordering::SeqCst).min(self.total);
            spinner.set_message(format!("[{current}/{}] {message}", self.total));
        }
    }

    fn line(&self, message: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.println(message);
        }
    }
}

impl PipelineObserver for ConsoleObserver {
    fn started(&self, target: &str) {
        self.current.fetch_add(1, Ordering::SeqCst);
        self.status(&format!("Resolving {target}..."));
    }

    fn resolved(&self, record: &PaperRecord) {
        self.status(&format!(
            "Fetching {} metadata for {}...",
            record.src_website, record.paper_id
        ));
    }

    fn scraped(&self, record: &PaperRecord) {
        let title = record.title.as_deref().unwrap_or(&record.paper_id);
        self.line(&format!("{title} [{}]", record.paper_id));
        if !record.authors.is_empty() {
            self.line(&format!("  {}", record.authors.join(", ")));
        }
        self.status(&format!("Downloading {title}..."));
    }

    fn downloaded(&self, _record: &PaperRecord, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Skipped(path) => {
                self.line(&format!("= {} (already present)", path.display()));
            }
            DownloadOutcome::Downloaded { path, strategy } => {
                self.line(&format!("+ {} ({strategy})", path.display()));
            }
        }
    }

    fn failed(&self, target: &str, error: &PipelineError) {
        let message = format!("x {target}: {error}");
        match &self.spinner {
            Some(spinner) => spinner.println(message),
            None => eprintln!("{message}"),
        }
    }
}
