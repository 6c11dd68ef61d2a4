//! The paper record shared by every pipeline stage.
//!
//! A [`PaperRecord`] is created by the resolver with identifiers and URLs,
//! filled in by a scraper, and finally consumed by the download manager and
//! the library collaborators.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Publication host a record was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceWebsite {
    /// arxiv.org
    #[serde(rename = "ArXiv")]
    ArXiv,
    /// openaccess.thecvf.com (CVPR, ICCV, WACV, ACCV)
    #[serde(rename = "CVF")]
    Cvf,
    /// ecva.net (ECCV)
    #[serde(rename = "ECVA")]
    Ecva,
    /// nips.cc
    #[serde(rename = "NeurIPS")]
    NeurIps,
    /// openreview.net
    #[serde(rename = "OpenReview")]
    OpenReview,
}

impl SourceWebsite {
    /// Returns the stable display label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ArXiv => "ArXiv",
            Self::Cvf => "CVF",
            Self::Ecva => "ECVA",
            Self::NeurIps => "NeurIPS",
            Self::OpenReview => "OpenReview",
        }
    }
}

impl fmt::Display for SourceWebsite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical metadata record for one paper.
///
/// `paper_id` and `src_website` are fixed at resolution time. Scrapers only
/// add information; they never clear a field that is already populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Source-native identifier (arXiv id, CVF slug, ECVA number).
    pub paper_id: String,
    /// Host the record was resolved from.
    pub src_website: SourceWebsite,
    /// Abstract page URL, when derivable.
    pub abs_url: Option<String>,
    /// PDF URL, when derivable.
    pub pdf_url: Option<String>,
    /// Supplementary material URL, discovered while scraping.
    pub supp_url: Option<String>,
    /// Conference year for venue-based sources.
    pub year: Option<u16>,
    /// Conference label such as `CVPR` or `CVPR_Workshops`.
    pub paper_venue: Option<String>,
    /// File name used verbatim for the downloaded PDF.
    pub download_name: Option<String>,
    pub title: Option<String>,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub comments: Option<String>,
    pub official_code_urls: Vec<String>,
    pub pwc_page_url: Option<String>,
    pub bibtex: Option<String>,
}

impl PaperRecord {
    /// Creates a bare record carrying only its identity.
    #[must_use]
    pub fn new(paper_id: impl Into<String>, src_website: SourceWebsite) -> Self {
        Self {
            paper_id: paper_id.into(),
            src_website,
            abs_url: None,
            pdf_url: None,
            supp_url: None,
            year: None,
            paper_venue: None,
            download_name: None,
            title: None,
            authors: Vec::new(),
            abstract_text: None,
            comments: None,
            official_code_urls: Vec::new(),
            pwc_page_url: None,
            bibtex: None,
        }
    }

    /// Sets the abstract and PDF URLs.
    #[must_use]
    pub fn with_urls(mut self, abs_url: Option<String>, pdf_url: Option<String>) -> Self {
        self.abs_url = abs_url;
        self.pdf_url = pdf_url;
        self
    }

    /// Sets venue, year and the venue-derived download name `{year}_{venue}_{id}.pdf`.
    #[must_use]
    pub fn with_venue(mut self, year: u16, venue: impl Into<String>) -> Self {
        let venue = venue.into();
        self.download_name = Some(format!(
            "{year}_{venue}_{}.pdf",
            filesystem_safe_id(&self.paper_id)
        ));
        self.year = Some(year);
        self.paper_venue = Some(venue);
        self
    }

    /// Returns true when the scraper has populated the descriptive fields.
    #[must_use]
    pub fn is_scraped(&self) -> bool {
        self.title.is_some() && !self.authors.is_empty()
    }
}

/// Replaces path separators in identifiers so they can be embedded in file names.
///
/// Legacy arXiv ids such as `math.GT/0211159` contain a slash.
#[must_use]
pub fn filesystem_safe_id(paper_id: &str) -> String {
    paper_id.replace(['/', '\\'], "_")
}
