//! Metadata scraping from each source's abstract page.
//!
//! Markup knowledge lives behind [`MetadataExtractor`], one implementation per
//! source, so a layout change on a site touches exactly one file. The async
//! [`Scraper`] implementations handle fetching and merge the extracted fields
//! into the record additively.
//!
//! # Architecture
//!
//! - [`MetadataExtractor`] - Pure `extract(html) -> fields` per source
//! - [`Scraper`] - Fetches the abstract page and applies fields to a record
//! - [`ArxivScraper`] - arXiv page plus Papers-with-Code and BibTeX lookups
//! - [`VenueScraper`] - CVF and ECVA pages (single fetch)
//! - [`ScraperRegistry`] - Dispatch by [`SourceWebsite`]

mod arxiv;
mod cvf;
mod ecva;
mod error;
mod normalize;

pub use arxiv::{ArxivExtractor, ArxivScraper, BIBTEX_BASE_URL, PWC_BASE_URL};
pub use cvf::CvfExtractor;
pub use ecva::EcvaExtractor;
pub use error::ScrapeError;
pub use normalize::normalize_title;

use std::fmt;
use std::sync::LazyLock;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::http::{HttpSettings, build_http_client};
use crate::record::{PaperRecord, SourceWebsite};

/// Fields pulled from one abstract page.
///
/// Link fields may be relative; they are resolved against the page URL when
/// applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub abstract_text: Option<String>,
    pub comments: Option<String>,
    pub bibtex: Option<String>,
    pub pdf_url: Option<String>,
    pub supp_url: Option<String>,
}

impl ExtractedFields {
    /// Merges these fields into `record`.
    ///
    /// Text fields are only overwritten by non-empty values. Link fields are
    /// only filled when the record has none.
    pub fn apply_to(self, record: &mut PaperRecord, page_url: &str) {
        set_if_present(&mut record.title, self.title);
        set_if_present(&mut record.abstract_text, self.abstract_text);
        set_if_present(&mut record.comments, self.comments);
        set_if_present(&mut record.bibtex, self.bibtex);
        if !self.authors.is_empty() {
            record.authors = self.authors;
        }

        let base = Url::parse(page_url).ok();
        if record.pdf_url.is_none() {
            record.pdf_url = self.pdf_url.and_then(|link| absolutize(&link, base.as_ref()));
        }
        if record.supp_url.is_none() {
            record.supp_url = self.supp_url.and_then(|link| absolutize(&link, base.as_ref()));
        }
    }
}

fn set_if_present(slot: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        *slot = Some(value);
    }
}

/// Resolves a possibly relative link against the page it was found on.
fn absolutize(link: &str, base: Option<&Url>) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    if link.starts_with("http://") || link.starts_with("https://") {
        return Some(link.to_string());
    }
    if let Some(rest) = link.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    base?.join(link).ok().map(|url| url.to_string())
}

/// Source-specific markup rules.
pub trait MetadataExtractor: Send + Sync {
    /// The source whose pages this extractor understands.
    fn source(&self) -> SourceWebsite;

    /// Extracts fields from an abstract page.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::MissingAnchor`] when a required element is absent.
    fn extract(&self, html: &str) -> Result<ExtractedFields, ScrapeError>;
}

/// Populates a record's descriptive fields from the network.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// The source this scraper handles.
    fn source(&self) -> SourceWebsite;

    /// Fetches the record's abstract page and merges the extracted fields.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] on fetch failures or missing required markup.
    /// Fields set before the failure are kept.
    async fn scrape(&self, record: &mut PaperRecord) -> Result<(), ScrapeError>;
}

/// Scraper for venues whose abstract page holds everything (CVF, ECVA).
pub struct VenueScraper {
    client: Client,
    extractor: Box<dyn MetadataExtractor>,
}

impl VenueScraper {
    /// Creates a scraper that fetches with `client` and parses with `extractor`.
    #[must_use]
    pub fn new(client: Client, extractor: Box<dyn MetadataExtractor>) -> Self {
        Self { client, extractor }
    }
}

#[async_trait]
impl Scraper for VenueScraper {
    fn source(&self) -> SourceWebsite {
        self.extractor.source()
    }

    #[tracing::instrument(skip(self, record), fields(source = %self.source(), paper_id = %record.paper_id))]
    async fn scrape(&self, record: &mut PaperRecord) -> Result<(), ScrapeError> {
        let abs_url = abstract_url(record)?;
        let html = fetch_text(&self.client, &abs_url).await?;
        let fields = self.extractor.extract(&html)?;
        fields.apply_to(record, &abs_url);
        debug!(title = ?record.title, authors = record.authors.len(), "Abstract page scraped");
        Ok(())
    }
}

/// Dispatches scraping by source.
pub struct ScraperRegistry {
    scrapers: Vec<Box<dyn Scraper>>,
}

impl ScraperRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scrapers: Vec::new(),
        }
    }

    /// Standard scrapers (arXiv, CVF, ECVA) sharing one client built from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Client`] if the HTTP client cannot be built.
    pub fn standard(settings: &HttpSettings) -> Result<Self, ScrapeError> {
        let client = build_http_client(settings).map_err(|source| ScrapeError::Client { source })?;
        Ok(Self::with_client(client))
    }

    /// Standard scrapers using an existing client and the public auxiliary endpoints.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ArxivScraper::new(client.clone())));
        registry.register(Box::new(VenueScraper::new(
            client.clone(),
            Box::new(CvfExtractor),
        )));
        registry.register(Box::new(VenueScraper::new(client, Box::new(EcvaExtractor))));
        registry
    }

    /// Adds a scraper; earlier registrations win for the same source.
    pub fn register(&mut self, scraper: Box<dyn Scraper>) {
        self.scrapers.push(scraper);
    }

    /// Returns the number of registered scrapers.
    #[must_use]
    pub fn scraper_count(&self) -> usize {
        self.scrapers.len()
    }

    /// Scrapes `record` with the scraper for its source.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::MissingAbstractUrl`] for records without an
    /// abstract URL, [`ScrapeError::Unsupported`] when no scraper handles the
    /// source, or the scraper's own error.
    pub async fn scrape(&self, record: &mut PaperRecord) -> Result<(), ScrapeError> {
        abstract_url(record)?;
        let Some(scraper) = self
            .scrapers
            .iter()
            .find(|s| s.source() == record.src_website)
        else {
            return Err(ScrapeError::Unsupported {
                website: record.src_website,
            });
        };
        scraper.scrape(record).await
    }
}

impl Default for ScraperRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScraperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScraperRegistry")
            .field(
                "sources",
                &self.scrapers.iter().map(|s| s.source()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn abstract_url(record: &PaperRecord) -> Result<String, ScrapeError> {
    record
        .abs_url
        .clone()
        .ok_or_else(|| ScrapeError::MissingAbstractUrl {
            paper_id: record.paper_id.clone(),
        })
}

/// GETs `url` and returns the body, failing on non-success statuses.
pub(crate) async fn fetch_text(client: &Client, url: &str) -> Result<String, ScrapeError> {
    debug!(url, "Fetching page");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ScrapeError::network(url, e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::http_status(url, status.as_u16()));
    }
    response.text().await.map_err(|e| ScrapeError::network(url, e))
}

/// Parses a selector at static init; panics on invalid pattern.
pub(crate) fn compile_static_selector(pattern: &str) -> Selector {
    Selector::parse(pattern).unwrap_or_else(|e| panic!("invalid static selector '{pattern}': {e}"))
}

/// Element text with whitespace runs collapsed to single spaces.
pub(crate) fn collapsed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("a[href]"));
static NAME_LIST_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("b i, i b, b, i"));

/// `href` of the first link whose visible text satisfies `label_matches`.
pub(crate) fn link_by_label(document: &Html, label_matches: impl Fn(&str) -> bool) -> Option<String> {
    document
        .select(&LINK_SELECTOR)
        .find(|link| label_matches(&collapsed_text(*link).to_ascii_lowercase()))
        .and_then(|link| link.value().attr("href"))
        .map(str::to_string)
}

/// Author names from a venue `#authors` block.
///
/// Names sit in a bold/italic run followed by `; Proceedings ...`. Without that
/// run, the text before the first `;` is used.
pub(crate) fn venue_author_names(authors: ElementRef<'_>) -> Vec<String> {
    let names = authors
        .select(&NAME_LIST_SELECTOR)
        .next()
        .map(collapsed_text)
        .unwrap_or_else(|| {
            let text = collapsed_text(authors);
            text.split(';').next().unwrap_or_default().to_string()
        });
    names.split(',').filter_map(non_empty).collect()
}

/// Collapses whitespace and returns `None` for blank text.
pub(crate) fn non_empty(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}
