//! ECVA resolver (ECCV proceedings on ecva.net).
//!
//! Paths look like `papers/eccv_{year}/papers_ECCV/{html|papers}/{file}`.
//! For 2020 and 2022 the abstract page and the PDF use unrelated numbering, so
//! only the URL kind that was given is known.

use super::utils::segments_after_host;
use super::{ResolveError, TargetResolver};
use crate::record::{PaperRecord, SourceWebsite};

const ECVA_HOST: &str = "ecva.net";
const ECVA_BASE_URL: &str = "https://www.ecva.net";
const ECVA_VENUE: &str = "ECCV";
/// First year whose abstract and PDF share a numeric id.
const SHARED_ID_FIRST_YEAR: u16 = 2024;
/// Numeric ids are zero-padded to this width in PDF names.
const PADDED_ID_WIDTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EcvaPage {
    Html,
    Papers,
}

/// Resolver for ecva.net.
#[derive(Debug, Default)]
pub struct EcvaResolver;

impl EcvaResolver {
    /// Creates a new `EcvaResolver`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TargetResolver for EcvaResolver {
    fn name(&self) -> &'static str {
        "ecva"
    }

    fn source(&self) -> SourceWebsite {
        SourceWebsite::Ecva
    }

    fn can_handle(&self, target: &str) -> bool {
        target.contains(ECVA_HOST)
    }

    #[tracing::instrument(skip(self), fields(resolver = "ecva"))]
    fn resolve(&self, target: &str) -> Result<PaperRecord, ResolveError> {
        let fail = |reason: &str| {
            ResolveError::resolution_failed(
                target,
                SourceWebsite::Ecva,
                &format!("Unexpected ECVA URL: {reason}"),
            )
        };

        let segments = segments_after_host(target, ECVA_HOST).unwrap_or_default();
        let [_, proceedings, _, kind, file_name] = segments.as_slice() else {
            return Err(fail("expected papers/eccv_YYYY/papers_ECCV/(html|papers)/FILE"));
        };

        let year = proceedings
            .strip_prefix("eccv_")
            .and_then(|y| y.parse::<u16>().ok())
            .ok_or_else(|| fail(&format!("no year in '{proceedings}'")))?;
        let page = match *kind {
            "html" => EcvaPage::Html,
            "papers" => EcvaPage::Papers,
            other => return Err(fail(&format!("unknown page kind '{other}'"))),
        };

        let (paper_id, abs_url, pdf_url) = match page {
            EcvaPage::Html => {
                let stem = file_name
                    .strip_suffix(".php")
                    .ok_or_else(|| fail("abstract pages end in .php"))?;
                let abs_url = Some(page_url(year, "html", file_name));
                if year >= SHARED_ID_FIRST_YEAR {
                    let paper_id = pad_id(numeric_prefix(stem));
                    let pdf_url = Some(page_url(year, "papers", &format!("{paper_id}.pdf")));
                    (paper_id, abs_url, pdf_url)
                } else if year == 2018 {
                    let pdf_url = Some(page_url(year, "papers", &format!("{stem}.pdf")));
                    (stem.to_string(), abs_url, pdf_url)
                } else if matches!(year, 2020 | 2022) {
                    (pad_id(numeric_prefix(stem)), abs_url, None)
                } else {
                    return Err(fail(&format!("no layout for year {year}")));
                }
            }
            EcvaPage::Papers => {
                let stem = file_name
                    .strip_suffix(".pdf")
                    .ok_or_else(|| fail("paper links end in .pdf"))?;
                let pdf_url = Some(page_url(year, "papers", file_name));
                if year >= SHARED_ID_FIRST_YEAR {
                    let short_id = stem.trim_start_matches('0');
                    let abs_url = Some(page_url(
                        year,
                        "html",
                        &format!("{short_id}_ECCV_{year}_paper.php"),
                    ));
                    (stem.to_string(), abs_url, pdf_url)
                } else if year == 2018 {
                    let abs_url = Some(page_url(year, "html", &format!("{stem}.php")));
                    (stem.to_string(), abs_url, pdf_url)
                } else if matches!(year, 2020 | 2022) {
                    tracing::info!(year, "Abstract URL cannot be derived from an ECVA PDF link for this year");
                    (stem.to_string(), None, pdf_url)
                } else {
                    return Err(fail(&format!("no layout for year {year}")));
                }
            }
        };

        if paper_id.is_empty() {
            return Err(fail("empty paper id"));
        }

        Ok(PaperRecord::new(paper_id, SourceWebsite::Ecva)
            .with_urls(abs_url, pdf_url)
            .with_venue(year, ECVA_VENUE))
    }
}

fn page_url(year: u16, kind: &str, file_name: &str) -> String {
    format!("{ECVA_BASE_URL}/papers/eccv_{year}/papers_ECCV/{kind}/{file_name}")
}

/// `19_ECCV_2022_paper` -> `19`
fn numeric_prefix(stem: &str) -> &str {
    stem.split('_').next().unwrap_or_default()
}

fn pad_id(id: &str) -> String {
    if id.is_empty() {
        return String::new();
    }
    format!("{id:0>width$}", width = PADDED_ID_WIDTH)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.ecva.net/papers";

    #[test]
    fn test_pad_id() {
        assert_eq!(pad_id("4"), "00004");
        assert_eq!(pad_id("6863"), "06863");
        assert_eq!(pad_id("123456"), "123456");
        assert_eq!(pad_id(""), "");
    }

    #[test]
    fn test_ecva_2024_html_derives_pdf() {
        let record = EcvaResolver::new()
            .resolve(&format!("{BASE}/eccv_2024/papers_ECCV/html/4_ECCV_2024_paper.php"))
            .unwrap();
        assert_eq!(record.paper_id, "00004");
        assert_eq!(
            record.pdf_url.as_deref(),
            Some("https://www.ecva.net/papers/eccv_2024/papers_ECCV/papers/00004.pdf")
        );
        assert_eq!(record.year, Some(2024));
        assert_eq!(record.paper_venue.as_deref(), Some("ECCV"));
        assert_eq!(record.download_name.as_deref(), Some("2024_ECCV_00004.pdf"));
    }

    #[test]
    fn test_ecva_2024_pdf_derives_abs() {
        let record = EcvaResolver::new()
            .resolve(&format!("{BASE}/eccv_2024/papers_ECCV/papers/06863.pdf"))
            .unwrap();
        assert_eq!(record.paper_id, "06863");
        assert_eq!(
            record.abs_url.as_deref(),
            Some("https://www.ecva.net/papers/eccv_2024/papers_ECCV/html/6863_ECCV_2024_paper.php")
        );
    }

    #[test]
    fn test_ecva_2022_html_has_no_pdf() {
        let record = EcvaResolver::new()
            .resolve(&format!("{BASE}/eccv_2022/papers_ECCV/html/19_ECCV_2022_paper.php"))
            .unwrap();
        assert_eq!(record.paper_id, "00019");
        assert!(record.pdf_url.is_none());
        assert!(record.abs_url.is_some());
    }

    #[test]
    fn test_ecva_2022_pdf_has_no_abs() {
        let record = EcvaResolver::new()
            .resolve(&format!("{BASE}/eccv_2022/papers_ECCV/papers/136610001.pdf"))
            .unwrap();
        assert_eq!(record.paper_id, "136610001");
        assert!(record.abs_url.is_none());
        assert_eq!(
            record.pdf_url.as_deref(),
            Some("https://www.ecva.net/papers/eccv_2022/papers_ECCV/papers/136610001.pdf")
        );
    }

    #[test]
    fn test_ecva_2018_round_trip() {
        let from_html = EcvaResolver::new()
            .resolve(&format!("{BASE}/eccv_2018/papers_ECCV/html/Zhe_Wang_Focus_ECCV_2018_paper.php"))
            .unwrap();
        let from_pdf = EcvaResolver::new()
            .resolve(from_html.pdf_url.as_deref().unwrap())
            .unwrap();
        assert_eq!(from_html.paper_id, from_pdf.paper_id);
        assert_eq!(from_html.abs_url, from_pdf.abs_url);
    }

    #[test]
    fn test_ecva_rejects_unexpected_shapes() {
        let resolver = EcvaResolver::new();
        for target in [
            "https://www.ecva.net/index.php",
            "https://www.ecva.net/papers/eccv_2024/papers_ECCV/supp/4.zip",
            "https://www.ecva.net/papers/eccv_2024/papers_ECCV/html/4_ECCV_2024_paper.html",
            "https://www.ecva.net/papers/eccv_2023/papers_ECCV/html/4_ECCV_2023_paper.php",
            "https://www.ecva.net/papers/eccv_2021/papers_ECCV/html/19_ECCV_2021_paper.php",
            "https://www.ecva.net/papers/eccv_2021/papers_ECCV/papers/136610001.pdf",
            "https://www.ecva.net/papers/eccv_2019/papers_ECCV/html/19_ECCV_2019_paper.php",
            "https://www.ecva.net/papers/eccv_2016/papers_ECCV/papers/00019.pdf",
            "https://www.ecva.net/papers/eccv/papers_ECCV/html/4_ECCV_2024_paper.php",
        ] {
            let err = resolver.resolve(target).unwrap_err();
            assert!(err.to_string().contains("Unexpected ECVA URL"), "{target}");
        }
    }
}
