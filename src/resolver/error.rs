//! Error types for target resolution.
//!
//! Messages follow the What/Why/Suggestion layout used across the crate.

use thiserror::Error;

use crate::record::SourceWebsite;

/// Errors that can occur while turning a target into a [`crate::PaperRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The input matches no known publication host or identifier shape.
    #[error("unknown source for '{input}': {reason}\n  Suggestion: {suggestion}")]
    UnknownSource {
        input: String,
        reason: String,
        suggestion: String,
    },

    /// The host is recognized but resolution for it is not implemented.
    #[error("unsupported source {website} for '{input}'\n  Suggestion: {suggestion}")]
    UnsupportedSource {
        input: String,
        website: SourceWebsite,
        suggestion: String,
    },

    /// The host is recognized but the URL does not fit any known grammar for it.
    #[error("resolution failed for '{input}' ({website}): {reason}\n  Suggestion: {suggestion}")]
    ResolutionFailed {
        input: String,
        website: SourceWebsite,
        reason: String,
        suggestion: String,
    },
}

impl ResolveError {
    /// Creates an `UnknownSource` error for input no resolver can handle.
    #[must_use]
    pub fn unknown_source(input: &str) -> Self {
        let reason = if input.trim().is_empty() {
            "the target is empty"
        } else {
            "not an arXiv id and not an arxiv.org, openaccess.thecvf.com or ecva.net URL"
        };
        Self::UnknownSource {
            input: input.to_string(),
            reason: reason.to_string(),
            suggestion: "Pass an arXiv id such as 2103.15538 or a paper page URL".to_string(),
        }
    }

    /// Creates an `UnsupportedSource` error.
    #[must_use]
    pub fn unsupported_source(input: &str, website: SourceWebsite) -> Self {
        Self::UnsupportedSource {
            input: input.to_string(),
            website,
            suggestion: "Download this paper manually or look for an arXiv version".to_string(),
        }
    }

    /// Creates a `ResolutionFailed` error.
    #[must_use]
    pub fn resolution_failed(input: &str, website: SourceWebsite, reason: &str) -> Self {
        Self::ResolutionFailed {
            input: input.to_string(),
            website,
            reason: reason.to_string(),
            suggestion: "Copy the abstract page or PDF link exactly as shown on the site"
                .to_string(),
        }
    }

    /// The input that failed to resolve.
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::UnknownSource { input, .. }
            | Self::UnsupportedSource { input, .. }
            | Self::ResolutionFailed { input, .. } => input,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_source_message() {
        let err = ResolveError::unknown_source("https://example.com/paper");
        let msg = err.to_string();
        assert!(msg.contains("example.com"), "should contain input");
        assert!(msg.contains("unknown source"));
        assert!(msg.contains("Suggestion"), "should have suggestion");
    }

    #[test]
    fn test_unknown_source_empty_input_reason() {
        let err = ResolveError::unknown_source("   ");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_unsupported_source_names_website() {
        let err = ResolveError::unsupported_source("https://papers.nips.cc/x", SourceWebsite::NeurIps);
        let msg = err.to_string();
        assert!(msg.contains("NeurIPS"));
        assert!(msg.contains("papers.nips.cc"));
        assert_eq!(err.input(), "https://papers.nips.cc/x");
    }

    #[test]
    fn test_resolution_failed_message() {
        let err = ResolveError::resolution_failed("x", SourceWebsite::Cvf, "Unexpected CVF URL");
        let msg = err.to_string();
        assert!(msg.contains("CVF"));
        assert!(msg.contains("Unexpected CVF URL"));
    }

    #[test]
    fn test_resolve_error_clone() {
        let err = ResolveError::unknown_source("test-input");
        assert_eq!(err.clone(), err);
    }
}
