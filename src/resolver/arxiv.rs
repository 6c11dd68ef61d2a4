//! arXiv resolver for bare identifiers and arxiv.org URLs.

use std::sync::LazyLock;

use regex::Regex;

use super::utils::{compile_static_regex, strip_query_and_fragment};
use super::{ResolveError, TargetResolver};
use crate::record::{PaperRecord, SourceWebsite};
use crate::validator::{ArxivId, ArxivScheme};

const ARXIV_BASE_URL: &str = "https://arxiv.org";
const ARXIV_HOST: &str = "arxiv.org";

static MODERN_SEARCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"\d{2}(?:0[1-9]|1[0-2])\.\d{4,5}(?:v\d+)?")
});

static LEGACY_SEARCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"[a-z\-]+(?:\.[A-Z]{2})?/\d{7,8}(?:v\d+)?")
});

/// Resolver for arXiv.
///
/// The version suffix is always dropped so records point at the latest
/// revision.
#[derive(Debug, Default)]
pub struct ArxivResolver;

impl ArxivResolver {
    /// Creates a new `ArxivResolver`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TargetResolver for ArxivResolver {
    fn name(&self) -> &'static str {
        "arxiv"
    }

    fn source(&self) -> SourceWebsite {
        SourceWebsite::ArXiv
    }

    fn can_handle(&self, target: &str) -> bool {
        let trimmed = target.trim();
        trimmed.starts_with(|c: char| c.is_ascii_digit())
            || trimmed.contains(ARXIV_HOST)
            || ArxivId::parse(trimmed).is_some_and(|id| id.scheme() == ArxivScheme::Legacy)
    }

    #[tracing::instrument(skip(self), fields(resolver = "arxiv"))]
    fn resolve(&self, target: &str) -> Result<PaperRecord, ResolveError> {
        let Some(id) = extract_arxiv_id(target) else {
            return Err(ResolveError::resolution_failed(
                target,
                SourceWebsite::ArXiv,
                "no valid arXiv identifier found",
            ));
        };

        let paper_id = id.without_version();
        let abs_url = format!("{ARXIV_BASE_URL}/abs/{paper_id}");
        let pdf_url = format!("{ARXIV_BASE_URL}/pdf/{paper_id}.pdf");
        Ok(PaperRecord::new(paper_id, SourceWebsite::ArXiv).with_urls(Some(abs_url), Some(pdf_url)))
    }
}

/// Pulls a valid arXiv id out of a bare id or any URL that embeds one.
fn extract_arxiv_id(target: &str) -> Option<ArxivId> {
    let trimmed = target.trim();
    if let Some(id) = ArxivId::parse(trimmed) {
        return Some(id);
    }

    let haystack = strip_query_and_fragment(trimmed);
    [&*MODERN_SEARCH_RE, &*LEGACY_SEARCH_RE]
        .into_iter()
        .filter_map(|re| re.find(haystack))
        .find_map(|m| ArxivId::parse(m.as_str()))
}
