//! CVF open access abstract pages.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{
    ExtractedFields, MetadataExtractor, ScrapeError, collapsed_text, compile_static_selector,
    link_by_label, non_empty, venue_author_names,
};
use crate::record::SourceWebsite;

const TITLE_SELECTOR: &str = "#papertitle";
const AUTHORS_SELECTOR: &str = "#authors";
const ABSTRACT_SELECTOR: &str = "#abstract";
const BIBREF_SELECTOR: &str = ".bibref";

struct CvfSelectors {
    title: Selector,
    authors: Selector,
    abstract_text: Selector,
    bibref: Selector,
}

static SELECTORS: LazyLock<CvfSelectors> = LazyLock::new(|| CvfSelectors {
    title: compile_static_selector(TITLE_SELECTOR),
    authors: compile_static_selector(AUTHORS_SELECTOR),
    abstract_text: compile_static_selector(ABSTRACT_SELECTOR),
    bibref: compile_static_selector(BIBREF_SELECTOR),
});

/// Markup rules for `openaccess.thecvf.com` abstract pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct CvfExtractor;

impl MetadataExtractor for CvfExtractor {
    fn source(&self) -> SourceWebsite {
        SourceWebsite::Cvf
    }

    fn extract(&self, html: &str) -> Result<ExtractedFields, ScrapeError> {
        let document = Html::parse_document(html);

        let title = document
            .select(&SELECTORS.title)
            .next()
            .and_then(|el| non_empty(&collapsed_text(el)))
            .ok_or_else(|| {
                ScrapeError::missing_anchor(SourceWebsite::Cvf, "title", TITLE_SELECTOR)
            })?;

        let authors = document
            .select(&SELECTORS.authors)
            .next()
            .map(venue_author_names)
            .unwrap_or_default();
        if authors.is_empty() {
            return Err(ScrapeError::missing_anchor(
                SourceWebsite::Cvf,
                "authors",
                AUTHORS_SELECTOR,
            ));
        }

        let abstract_text = document
            .select(&SELECTORS.abstract_text)
            .next()
            .and_then(|el| non_empty(&collapsed_text(el)));

        // BibTeX keeps its line structure.
        let bibtex = document.select(&SELECTORS.bibref).next().and_then(|el| {
            let text = el.text().collect::<String>();
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        });

        Ok(ExtractedFields {
            title: Some(title),
            authors,
            abstract_text,
            comments: None,
            bibtex,
            pdf_url: link_by_label(&document, |label| label == "pdf"),
            supp_url: link_by_label(&document, |label| label == "supp"),
        })
    }
}
