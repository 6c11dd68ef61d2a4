//! Target resolution: turning a raw identifier or URL into a [`PaperRecord`].
//!
//! Resolution is offline. Each source has its own [`TargetResolver`] that
//! classifies input by substring or shape and rebuilds canonical abstract and
//! PDF URLs from the source's URL grammar.
//!
//! # Architecture
//!
//! - [`TargetResolver`] - Trait implemented by each source resolver
//! - [`ResolverRegistry`] - Ordered collection; the first resolver that can handle the input wins
//! - [`ArxivResolver`] - Modern and legacy arXiv ids and arxiv.org URLs
//! - [`CvfResolver`] - openaccess.thecvf.com, one rule per URL era
//! - [`EcvaResolver`] - ecva.net (ECCV)
//! - [`UnsupportedResolver`] - Recognized hosts without a resolver (OpenReview, NeurIPS)
//!
//! # Example
//!
//! ```
//! use paperdl_core::resolver::resolve;
//!
//! let record = resolve("https://arxiv.org/abs/2103.15538v2").unwrap();
//! assert_eq!(record.paper_id, "2103.15538");
//! assert_eq!(record.pdf_url.as_deref(), Some("https://arxiv.org/pdf/2103.15538.pdf"));
//! ```

mod arxiv;
mod cvf;
mod ecva;
mod error;
mod registry;
mod unsupported;
mod utils;

pub use arxiv::ArxivResolver;
pub use cvf::CvfResolver;
pub use ecva::EcvaResolver;
pub use error::ResolveError;
pub use registry::ResolverRegistry;
pub use unsupported::UnsupportedResolver;
pub(crate) use utils::compile_static_regex;

use crate::record::{PaperRecord, SourceWebsite};

/// A source-specific resolver.
///
/// Implementations must not perform I/O; everything is derived from the
/// target string.
pub trait TargetResolver: Send + Sync {
    /// Short lowercase name used in logs.
    fn name(&self) -> &'static str;

    /// The source this resolver produces records for.
    fn source(&self) -> SourceWebsite;

    /// Returns true if this resolver claims the target.
    fn can_handle(&self, target: &str) -> bool;

    /// Builds the record for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the target violates this source's URL
    /// grammar or when the source is not supported.
    fn resolve(&self, target: &str) -> Result<PaperRecord, ResolveError>;
}

/// Resolves `target` with the standard resolver set.
///
/// # Errors
///
/// Returns [`ResolveError::UnknownSource`] when no resolver claims the target,
/// or the error of the resolver that did.
pub fn resolve(target: &str) -> Result<PaperRecord, ResolveError> {
    ResolverRegistry::standard().resolve(target)
}
