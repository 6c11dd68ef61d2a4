//! Error types for metadata scraping.

use thiserror::Error;

use crate::record::SourceWebsite;

/// Errors that can occur while scraping an abstract page.
///
/// Auxiliary lookups (code links, BibTeX) never produce these; their failures
/// are logged and leave the corresponding fields empty.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network-level error (DNS, connection refused, TLS).
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out.
    #[error("timeout fetching {url}\n  Suggestion: Check your connection or raise scrape_read_timeout_secs")]
    Timeout { url: String },

    /// The abstract page answered with a non-success status.
    #[error("HTTP {status} fetching {url}\n  Suggestion: Check that the paper page exists in a browser")]
    HttpStatus { url: String, status: u16 },

    /// A required markup anchor is missing from the page.
    #[error(
        "{website} page is missing the {field} ({selector})\n  Suggestion: The site layout may have changed; please report this page"
    )]
    MissingAnchor {
        website: SourceWebsite,
        field: &'static str,
        selector: &'static str,
    },

    /// No scraper exists for this source.
    #[error("scraping {website} pages is not supported")]
    Unsupported { website: SourceWebsite },

    /// The record carries no abstract URL to fetch.
    #[error("no abstract page known for '{paper_id}'\n  Suggestion: Pass the abstract page URL instead of the PDF link")]
    MissingAbstractUrl { paper_id: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client for scraping: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
}

impl ScrapeError {
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

    /// Creates a missing-anchor error.
    #[must_use]
    pub fn missing_anchor(website: SourceWebsite, field: &'static str, selector: &'static str) -> Self {
        Self::MissingAnchor {
            website,
            field,
            selector,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let msg = ScrapeError::http_status("https://arxiv.org/abs/2103.15538", 404).to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("arxiv.org/abs/2103.15538"));
    }

    #[test]
    fn test_missing_anchor_display() {
        let msg =
            ScrapeError::missing_anchor(SourceWebsite::Cvf, "title", "#papertitle").to_string();
        assert!(msg.contains("CVF"));
        assert!(msg.contains("#papertitle"));
        assert!(msg.contains("Suggestion"));
    }

    #[test]
    fn test_missing_abstract_url_display() {
        let msg = ScrapeError::MissingAbstractUrl {
            paper_id: "136610001".to_string(),
        }
        .to_string();
        assert!(msg.contains("136610001"));
    }
}
