//! ECVA (ECCV) abstract pages.
//!
//! For 2020 and 2022 the abstract page is the only place the PDF link can be
//! found, so the `pdf` anchor fills the record's `pdf_url`.

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

struct EcvaSelectors {
    title: Selector,
    authors: Selector,
    abstract_text: Selector,
}

static SELECTORS: LazyLock<EcvaSelectors> = LazyLock::new(|| EcvaSelectors {
    title: compile_static_selector(TITLE_SELECTOR),
    authors: compile_static_selector(AUTHORS_SELECTOR),
    abstract_text: compile_static_selector(ABSTRACT_SELECTOR),
});

/// Markup rules for `ecva.net` abstract pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct EcvaExtractor;

impl MetadataExtractor for EcvaExtractor {
    fn source(&self) -> SourceWebsite {
        SourceWebsite::Ecva
    }

    fn extract(&self, html: &str) -> Result<ExtractedFields, ScrapeError> {
        let document = Html::parse_document(html);

        let title = document
            .select(&SELECTORS.title)
            .next()
            .and_then(|el| non_empty(&collapsed_text(el)))
            .ok_or_else(|| {
                ScrapeError::missing_anchor(SourceWebsite::Ecva, "title", TITLE_SELECTOR)
            })?;

        // Equal-contribution markers: "Ruoxi Shi*"
        let authors: Vec<String> = document
            .select(&SELECTORS.authors)
            .next()
            .map(venue_author_names)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|name| non_empty(name.trim_end_matches('*')))
            .collect();
        if authors.is_empty() {
            return Err(ScrapeError::missing_anchor(
                SourceWebsite::Ecva,
                "authors",
                AUTHORS_SELECTOR,
            ));
        }

        let abstract_text = document
            .select(&SELECTORS.abstract_text)
            .next()
            .and_then(|el| non_empty(&collapsed_text(el)));

        Ok(ExtractedFields {
            title: Some(title),
            authors,
            abstract_text,
            pdf_url: link_by_label(&document, |label| label == "pdf"),
            supp_url: link_by_label(&document, |label| label.starts_with("supp")),
            ..ExtractedFields::default()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ABS_PAGE: &str = r#"
        <html><body><div id="content">
        <div id="papertitle">Towards Open-Vocabulary Scene Graph Generation</div>
        <div id="authors"><br><b><i>Rongjie Li*, Songyang Zhang*, Xuming He</i></b></div>
        <div id="abstract">Scene graph generation (SGG) aims to parse a visual scene.</div>
        [<a href="../papers/136880056.pdf">pdf</a>]
        <a href="../papers/136880056-supp.pdf">supplementary material</a>
        [<a href="https://doi.org/10.1007/978-3-031-19815-1_4">DOI</a>]
        </div></body></html>
    "#;

    #[test]
    fn test_extract_ecva_page() {
        let fields = EcvaExtractor.extract(ABS_PAGE).unwrap();
        assert_eq!(
            fields.title.as_deref(),
            Some("Towards Open-Vocabulary Scene Graph Generation")
        );
        assert_eq!(fields.authors, vec!["Rongjie Li", "Songyang Zhang", "Xuming He"]);
        assert_eq!(fields.pdf_url.as_deref(), Some("../papers/136880056.pdf"));
        assert_eq!(fields.supp_url.as_deref(), Some("../papers/136880056-supp.pdf"));
        assert!(fields.bibtex.is_none());
    }

    #[test]
    fn test_missing_title_is_error() {
        let err = EcvaExtractor
            .extract(r#"<div id="authors"><b><i>A</i></b></div>"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingAnchor {
                website: SourceWebsite::Ecva,
                field: "title",
                ..
            }
        ));
    }
}
