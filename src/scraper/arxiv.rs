//! arXiv abstract pages plus the Papers-with-Code and BibTeX lookups.

use std::sync::LazyLock;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{
    ExtractedFields, MetadataExtractor, ScrapeError, Scraper, collapsed_text,
    compile_static_selector, fetch_text, non_empty, normalize_title,
};
use crate::record::{PaperRecord, SourceWebsite, filesystem_safe_id};

/// Papers-with-Code API base; the arXiv id is appended as a path segment.
pub const PWC_BASE_URL: &str = "https://arxiv.paperswithcode.com/api/v0/papers";
/// arXiv BibTeX export base; the arXiv id is appended as a path segment.
pub const BIBTEX_BASE_URL: &str = "https://arxiv.org/bibtex";

const TITLE_SELECTOR: &str = "h1.title";
const AUTHORS_SELECTOR: &str = "div.authors";
const ABSTRACT_SELECTOR: &str = "blockquote.abstract";
const COMMENTS_SELECTOR: &str = "td.comments";

struct ArxivSelectors {
    title: Selector,
    authors: Selector,
    abstract_text: Selector,
    comments: Selector,
}

static SELECTORS: LazyLock<ArxivSelectors> = LazyLock::new(|| ArxivSelectors {
    title: compile_static_selector(TITLE_SELECTOR),
    authors: compile_static_selector(AUTHORS_SELECTOR),
    abstract_text: compile_static_selector(ABSTRACT_SELECTOR),
    comments: compile_static_selector(COMMENTS_SELECTOR),
});

/// Markup rules for `arxiv.org/abs/...` pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArxivExtractor;

impl MetadataExtractor for ArxivExtractor {
    fn source(&self) -> SourceWebsite {
        SourceWebsite::ArXiv
    }

    fn extract(&self, html: &str) -> Result<ExtractedFields, ScrapeError> {
        let document = Html::parse_document(html);
        let missing =
            |field, selector| ScrapeError::missing_anchor(SourceWebsite::ArXiv, field, selector);

        let title = document
            .select(&SELECTORS.title)
            .next()
            .and_then(|el| non_empty(&text_after_descriptor(el)))
            .ok_or_else(|| missing("title", TITLE_SELECTOR))?;

        let authors: Vec<String> = document
            .select(&SELECTORS.authors)
            .next()
            .map(|el| {
                text_after_descriptor(el)
                    .split(',')
                    .filter_map(non_empty)
                    .collect()
            })
            .unwrap_or_default();
        if authors.is_empty() {
            return Err(missing("authors", AUTHORS_SELECTOR));
        }

        let abstract_text = document
            .select(&SELECTORS.abstract_text)
            .next()
            .and_then(|el| non_empty(&text_after_descriptor(el)))
            .ok_or_else(|| missing("abstract", ABSTRACT_SELECTOR))?;

        let comments = document
            .select(&SELECTORS.comments)
            .next()
            .and_then(|el| non_empty(&collapsed_text(el)));

        Ok(ExtractedFields {
            title: Some(title),
            authors,
            abstract_text: Some(abstract_text),
            comments,
            ..ExtractedFields::default()
        })
    }
}

/// Text of `element` without its `.descriptor` label children (`Title:`, `Authors:`).
fn text_after_descriptor(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for child in element.children() {
        if let Some(fragment) = child.value().as_text() {
            text.push_str(fragment);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if child_el.value().classes().any(|class| class == "descriptor") {
                continue;
            }
            text.extend(child_el.text());
        }
        text.push(' ');
    }
    text
}

#[derive(Debug, Deserialize)]
struct PwcPaper {
    #[serde(default)]
    all_official: Vec<PwcRepository>,
    #[serde(default)]
    paper_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PwcRepository {
    #[serde(default)]
    url: Option<String>,
}

/// Scraper for arXiv records.
///
/// The abstract page is required. The code-link and BibTeX lookups are
/// best-effort and only log on failure.
pub struct ArxivScraper {
    client: Client,
    pwc_base_url: String,
    bibtex_base_url: String,
}

impl ArxivScraper {
    /// Creates a scraper against the public auxiliary endpoints.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_endpoints(client, PWC_BASE_URL, BIBTEX_BASE_URL)
    }

    /// Creates a scraper with custom auxiliary endpoints.
    #[must_use]
    pub fn with_endpoints(
        client: Client,
        pwc_base_url: impl Into<String>,
        bibtex_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            pwc_base_url: pwc_base_url.into().trim_end_matches('/').to_string(),
            bibtex_base_url: bibtex_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_code_links(&self, paper_id: &str) -> Option<PwcPaper> {
        let url = format!("{}/{paper_id}", self.pwc_base_url);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(url, error = %error, "Papers-with-Code lookup failed");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(url, status = response.status().as_u16(), "No Papers-with-Code entry");
            return None;
        }
        match response.json::<PwcPaper>().await {
            Ok(paper) => Some(paper),
            Err(error) => {
                warn!(url, error = %error, "Papers-with-Code response could not be parsed");
                None
            }
        }
    }

    async fn fetch_bibtex(&self, paper_id: &str) -> Option<String> {
        let url = format!("{}/{paper_id}", self.bibtex_base_url);
        match fetch_text(&self.client, &url).await {
            Ok(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            Err(error) => {
                warn!(url, error = %error, "BibTeX lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl Scraper for ArxivScraper {
    fn source(&self) -> SourceWebsite {
        SourceWebsite::ArXiv
    }

    #[tracing::instrument(skip(self, record), fields(source = "arxiv", paper_id = %record.paper_id))]
    async fn scrape(&self, record: &mut PaperRecord) -> Result<(), ScrapeError> {
        let abs_url = record
            .abs_url
            .clone()
            .ok_or_else(|| ScrapeError::MissingAbstractUrl {
                paper_id: record.paper_id.clone(),
            })?;

        let html = fetch_text(&self.client, &abs_url).await?;
        ArxivExtractor.extract(&html)?.apply_to(record, &abs_url);

        if let Some(pwc) = self.fetch_code_links(&record.paper_id).await {
            let official: Vec<String> = pwc
                .all_official
                .into_iter()
                .filter_map(|repo| repo.url.and_then(|url| non_empty(&url)))
                .collect();
            if !official.is_empty() {
                record.official_code_urls = official;
            }
            if let Some(page) = pwc.paper_url.and_then(|url| non_empty(&url)) {
                record.pwc_page_url = Some(page);
            }
        }

        if let Some(bibtex) = self.fetch_bibtex(&record.paper_id).await {
            record.bibtex = Some(bibtex);
        }

        if record.download_name.is_none()
            && let Some(title) = record.title.as_deref()
        {
            record.download_name = Some(format!(
                "{}_{}.pdf",
                filesystem_safe_id(&record.paper_id),
                normalize_title(title)
            ));
        }

        debug!(
            title = ?record.title,
            code_links = record.official_code_urls.len(),
            "arXiv metadata scraped"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ABS_PAGE: &str = r#"
        <html><body>
        <h1 class="title mathjax"><span class="descriptor">Title:</span>Meta Compositional Referring Expression Segmentation</h1>
        <div class="authors"><span class="descriptor">Authors:</span><a href="/a/xu_l_1">Li Xu</a>, <a href="/a/huang_m_1">Mark He Huang</a>, <a href="/a/shang_x_1">Xindi Shang</a></div>
        <blockquote class="abstract mathjax"><span class="descriptor">Abstract:</span>Referring expression segmentation
        aims to segment an object described by a language expression.</blockquote>
        <table><tr><td class="tablecell comments mathjax">Accepted by CVPR 2023</td></tr></table>
        </body></html>
    "#;

    #[test]
    fn test_extract_full_page() {
        let fields = ArxivExtractor.extract(ABS_PAGE).unwrap();
        assert_eq!(
            fields.title.as_deref(),
            Some("Meta Compositional Referring Expression Segmentation")
        );
        assert_eq!(fields.authors, vec!["Li Xu", "Mark He Huang", "Xindi Shang"]);
        assert_eq!(
            fields.abstract_text.as_deref(),
            Some(
                "Referring expression segmentation aims to segment an object described by a language expression."
            )
        );
        assert_eq!(fields.comments.as_deref(), Some("Accepted by CVPR 2023"));
        assert!(fields.pdf_url.is_none());
    }

    #[test]
    fn test_extract_without_comments() {
        let html = ABS_PAGE.replace("Accepted by CVPR 2023", "");
        let fields = ArxivExtractor.extract(&html).unwrap();
        assert!(fields.comments.is_none());
    }

    #[test]
    fn test_extract_missing_title_is_error() {
        let html = ABS_PAGE.replace("h1 class=\"title mathjax\"", "h1 class=\"heading\"");
        let err = ArxivExtractor.extract(&html).unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingAnchor { field: "title", .. }
        ));
    }

    #[test]
    fn test_extract_missing_abstract_is_error() {
        let err = ArxivExtractor
            .extract("<h1 class=\"title\">T</h1><div class=\"authors\"><a>A</a></div>")
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingAnchor { field: "abstract", .. }
        ));
    }

    #[test]
    fn test_extract_descriptor_only_authors_is_error() {
        let html = r#"<h1 class="title">T</h1><div class="authors"><span class="descriptor">Authors:</span> , </div>"#;
        let err = ArxivExtractor.extract(html).unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingAnchor { field: "authors", .. }
        ));
    }

    #[test]
    fn test_endpoints_trim_trailing_slash() {
        let scraper = ArxivScraper::with_endpoints(Client::new(), "http://pwc/", "http://bib//");
        assert_eq!(scraper.pwc_base_url, "http://pwc");
        assert_eq!(scraper.bibtex_base_url, "http://bib");
    }
}
