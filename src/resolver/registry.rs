//! Ordered resolver registry.

use std::fmt;

use tracing::{debug, info};

use super::{
    ArxivResolver, CvfResolver, EcvaResolver, ResolveError, TargetResolver, UnsupportedResolver,
};
use crate::record::PaperRecord;

/// An ordered collection of resolvers.
///
/// Dispatch walks resolvers in registration order and hands the target to the
/// first one whose `can_handle` returns true. Later resolvers are never tried,
/// even if the chosen one fails.
pub struct ResolverRegistry {
    resolvers: Vec<Box<dyn TargetResolver>>,
}

impl ResolverRegistry {
    /// Creates an empty resolver registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Registry in the standard dispatch order: arXiv, CVF, ECVA, OpenReview, NeurIPS.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ArxivResolver::new()));
        registry.register(Box::new(CvfResolver::new()));
        registry.register(Box::new(EcvaResolver::new()));
        registry.register(Box::new(UnsupportedResolver::openreview()));
        registry.register(Box::new(UnsupportedResolver::neurips()));
        registry
    }

    /// Appends a resolver to the dispatch order.
    pub fn register(&mut self, resolver: Box<dyn TargetResolver>) {
        debug!(name = resolver.name(), source = %resolver.source(), "Registering resolver");
        self.resolvers.push(resolver);
    }

    /// Returns the number of registered resolvers.
    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }

    /// Returns true if no resolvers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Returns the first resolver that claims `target`.
    #[must_use]
    pub fn find_handler(&self, target: &str) -> Option<&dyn TargetResolver> {
        self.resolvers
            .iter()
            .find(|r| r.can_handle(target))
            .map(AsRef::as_ref)
    }

    /// Resolves `target` with the first matching resolver.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownSource`] for empty input or input no
    /// resolver claims; otherwise propagates the chosen resolver's error.
    #[tracing::instrument(skip(self), fields(target = %target))]
    pub fn resolve(&self, target: &str) -> Result<PaperRecord, ResolveError> {
        let trimmed = target.trim();
        if trimmed.is_empty() {
            return Err(ResolveError::unknown_source(target));
        }

        let Some(handler) = self.find_handler(trimmed) else {
            return Err(ResolveError::unknown_source(trimmed));
        };
        debug!(resolver = handler.name(), "Selected resolver");

        let record = handler.resolve(trimmed)?;
        info!(
            resolver = handler.name(),
            paper_id = %record.paper_id,
            source = %record.src_website,
            "Target resolved"
        );
        Ok(record)
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field(
                "resolvers",
                &self.resolvers.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
