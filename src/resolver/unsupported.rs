//! Placeholder resolvers for hosts that are recognized but not supported.
//!
//! Claiming these hosts keeps them from falling through to the generic
//! "unknown source" error; resolution always reports the source as unsupported.

use super::{ResolveError, TargetResolver};
use crate::record::{PaperRecord, SourceWebsite};

/// A recognized host with no resolver behind it.
#[derive(Debug, Clone)]
pub struct UnsupportedResolver {
    name: &'static str,
    source: SourceWebsite,
    host: &'static str,
}

impl UnsupportedResolver {
    /// openreview.net
    #[must_use]
    pub fn openreview() -> Self {
        Self {
            name: "openreview",
            source: SourceWebsite::OpenReview,
            host: "openreview.net",
        }
    }

    /// nips.cc (NeurIPS proceedings)
    #[must_use]
    pub fn neurips() -> Self {
        Self {
            name: "neurips",
            source: SourceWebsite::NeurIps,
            host: "nips.cc",
        }
    }
}

impl TargetResolver for UnsupportedResolver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn source(&self) -> SourceWebsite {
        self.source
    }

    fn can_handle(&self, target: &str) -> bool {
        target.contains(self.host)
    }

    fn resolve(&self, target: &str) -> Result<PaperRecord, ResolveError> {
        tracing::warn!(source = %self.source, "Source recognized but not supported");
        Err(ResolveError::unsupported_source(target, self.source))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_neurips_is_claimed_and_rejected() {
        let resolver = UnsupportedResolver::neurips();
        let target = "https://papers.nips.cc/paper/2020/hash/abc-Abstract.html";
        assert!(resolver.can_handle(target));
        let err = resolver.resolve(target).unwrap_err();
        assert_eq!(err, ResolveError::unsupported_source(target, SourceWebsite::NeurIps));
    }

    #[test]
    fn test_openreview_is_claimed_and_rejected() {
        let resolver = UnsupportedResolver::openreview();
        assert_eq!(resolver.name(), "openreview");
        assert!(resolver.can_handle("https://openreview.net/forum?id=abc"));
        assert!(!resolver.can_handle("https://arxiv.org/abs/2103.15538"));
    }
}
