//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

use super::constants::MAX_PARALLELISM;

/// Errors that can occur while fetching a paper PDF.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors).
    #[error("network error downloading {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}\n  Suggestion: Raise download_read_timeout_secs for very large files")]
    Timeout { url: String },

    /// The PDF URL answered with a non-success status.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus { url: String, status: u16 },

    /// File system error while writing or renaming.
    #[error("IO error writing to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PDF URL could not be parsed.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Bytes written disagree with the announced Content-Length.
    #[error(
        "integrity check failed for {path}: expected {expected_bytes} bytes, got {actual_bytes}"
    )]
    Integrity {
        path: PathBuf,
        expected_bytes: u64,
        actual_bytes: u64,
    },

    /// Requested connection count is outside the supported range.
    #[error(
        "invalid parallelism {requested}: must be between 1 and {max}\n  Suggestion: Pass a value such as --parallel 5",
        max = MAX_PARALLELISM
    )]
    InvalidParallelism { requested: usize },

    /// The record lacks a field needed to download.
    #[error("cannot download '{paper_id}': record has no {field}\n  Suggestion: {suggestion}")]
    MissingField {
        paper_id: String,
        field: &'static str,
        suggestion: &'static str,
    },

    /// The external segmented downloader failed.
    #[error("{program} failed ({status}) downloading {url}{output}")]
    ExternalTool {
        program: String,
        url: String,
        /// Exit code, or `None` when the process was killed or never started.
        code: Option<i32>,
        status: String,
        /// Captured tool output, prefixed with a newline when non-empty.
        output: String,
    },

    /// The download HTTP client could not be constructed.
    #[error("failed to build HTTP client for downloads: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
    /// Creates a network error, promoting timeouts to `Timeout`.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an integrity mismatch error.
    pub fn integrity(path: impl Into<PathBuf>, expected_bytes: u64, actual_bytes: u64) -> Self {
        Self::Integrity {
            path: path.into(),
            expected_bytes,
            actual_bytes,
        }
    }

    /// Creates a missing-field error for `pdf_url` or `download_name`.
    pub fn missing_field(paper_id: impl Into<String>, field: &'static str) -> Self {
        let suggestion = match field {
            "pdf_url" => "Pass the PDF URL, or an abstract URL whose page links the PDF",
            _ => "Scrape the record before downloading so a file name can be derived",
        };
        Self::MissingField {
            paper_id: paper_id.into(),
            field,
            suggestion,
        }
    }

    /// Creates an external-tool failure.
    pub fn external_tool(
        program: impl Into<String>,
        url: impl Into<String>,
        code: Option<i32>,
        output: &str,
    ) -> Self {
        let status = code.map_or_else(|| "terminated".to_string(), |c| format!("exit code {c}"));
        let output = output.trim();
        Self::ExternalTool {
            program: program.into(),
            url: url.into(),
            code,
            status,
            output: if output.is_empty() {
                String::new()
            } else {
                format!("\n{output}")
            },
        }
    }
}
