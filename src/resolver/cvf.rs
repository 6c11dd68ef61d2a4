//! CVF open access resolver (CVPR, ICCV, WACV, ACCV).
//!
//! The site's path layout changed almost every year. Each layout is one
//! `CvfRule`; rules are tried in order and the first whose year predicate
//! and segment count match builds the URLs. New eras are appended to
//! `CVF_RULES` without touching existing entries.
//!
//! Path segments are counted after the host, e.g.
//! `content/CVPR2021/html/Name_Title_CVPR_2021_paper.html` has four.

use std::sync::LazyLock;

use regex::Regex;

use super::utils::{compile_static_regex, segments_after_host};
use super::{ResolveError, TargetResolver};
use crate::record::{PaperRecord, SourceWebsite};

const CVF_HOST: &str = "openaccess.thecvf.com";
const CVF_BASE_URL: &str = "https://openaccess.thecvf.com";
const UNEXPECTED: &str = "Unexpected CVF URL";

/// Venue labels in priority order; the first contained in the venue segment wins.
const VENUE_LABELS: [&str; 4] = ["ICCV", "CVPR", "WACV", "ACCV"];

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"20\d\d"));

/// The parts of a CVF URL every rule needs.
#[derive(Debug)]
struct CvfPath<'a> {
    segments: Vec<&'a str>,
    /// Last segment including its extension.
    file_name: &'a str,
    /// `file_name` without `.html`/`.pdf`.
    target_name: &'a str,
    is_html: bool,
}

impl CvfPath<'_> {
    fn segment(&self, index: usize) -> &str {
        self.segments.get(index).copied().unwrap_or_default()
    }
}

/// URLs and naming inputs produced by one rule.
#[derive(Debug)]
struct CvfLayout {
    venue_segment: String,
    workshop: Option<String>,
    abs_url: String,
    pdf_url: String,
}

/// One row of the era table.
struct CvfRule {
    era: &'static str,
    applies: fn(year: u16, file_name: &str) -> bool,
    segment_count: usize,
    layout: fn(&CvfPath<'_>) -> CvfLayout,
}

const CVF_RULES: &[CvfRule] = &[
    CvfRule {
        era: "classic",
        applies: is_classic_era,
        segment_count: 3,
        layout: plain_main,
    },
    CvfRule {
        era: "classic-workshop",
        applies: is_classic_era,
        segment_count: 4,
        layout: classic_workshop,
    },
    CvfRule {
        era: "iccv-2017",
        applies: is_iccv_2017,
        segment_count: 3,
        layout: iccv_2017_main,
    },
    CvfRule {
        era: "iccv-2017-workshop",
        applies: is_iccv_2017,
        segment_count: 4,
        layout: split_papers_workshop,
    },
    CvfRule {
        era: "2018",
        applies: |year, _| year == 2018,
        segment_count: 3,
        layout: plain_main,
    },
    CvfRule {
        era: "2018-workshop",
        applies: |year, _| year == 2018,
        segment_count: 4,
        layout: split_papers_workshop,
    },
    CvfRule {
        era: "2019-2020",
        applies: |year, _| (2019..=2020).contains(&year),
        segment_count: 3,
        layout: plain_main,
    },
    CvfRule {
        era: "2019-2020-workshop",
        applies: |year, _| (2019..=2020).contains(&year),
        segment_count: 4,
        layout: trailing_workshop,
    },
    CvfRule {
        era: "content",
        applies: |year, _| year >= 2021,
        segment_count: 4,
        layout: content_main,
    },
    CvfRule {
        era: "content-workshop",
        applies: |year, _| year >= 2021,
        segment_count: 5,
        layout: content_workshop,
    },
];

fn is_classic_era(year: u16, file_name: &str) -> bool {
    (2013..=2016).contains(&year) || (year == 2017 && file_name.contains("CVPR"))
}

fn is_iccv_2017(year: u16, file_name: &str) -> bool {
    year == 2017 && file_name.contains("ICCV")
}

fn urls(mid_abs: &str, mid_pdf: &str, target_name: &str) -> (String, String) {
    (
        format!("{CVF_BASE_URL}/{mid_abs}/{target_name}.html"),
        format!("{CVF_BASE_URL}/{mid_pdf}/{target_name}.pdf"),
    )
}

/// `{venue}/html|papers/{name}`
fn plain_main(path: &CvfPath<'_>) -> CvfLayout {
    let venue = path.segment(0);
    let (abs_url, pdf_url) = urls(&format!("{venue}/html"), &format!("{venue}/papers"), path.target_name);
    CvfLayout {
        venue_segment: venue.to_string(),
        workshop: None,
        abs_url,
        pdf_url,
    }
}

/// `{venue}/{workshop}/html|papers/{name}`
fn classic_workshop(path: &CvfPath<'_>) -> CvfLayout {
    let venue = path.segment(0);
    let workshop = path.segment(1);
    let mid = format!("{venue}/{workshop}");
    let (abs_url, pdf_url) = urls(&format!("{mid}/html"), &format!("{mid}/papers"), path.target_name);
    CvfLayout {
        venue_segment: venue.to_string(),
        workshop: Some(workshop.to_string()),
        abs_url,
        pdf_url,
    }
}

/// The abstract page lives under lowercase `content_iccv_2017`, the PDF under uppercase.
fn iccv_2017_main(path: &CvfPath<'_>) -> CvfLayout {
    let (abs_url, pdf_url) = urls(
        "content_iccv_2017/html",
        "content_ICCV_2017/papers",
        path.target_name,
    );
    CvfLayout {
        venue_segment: path.segment(0).to_string(),
        workshop: None,
        abs_url,
        pdf_url,
    }
}

/// Abstract under `{venue}/{workshop}/html`, PDF under `{venue}/papers/{workshop}`.
///
/// The workshop segment sits at index 1 in abstract URLs and index 2 in PDF URLs.
fn split_papers_workshop(path: &CvfPath<'_>) -> CvfLayout {
    let venue = path.segment(0);
    let workshop = if path.is_html {
        path.segment(1)
    } else {
        path.segment(2)
    };
    let (abs_url, pdf_url) = urls(
        &format!("{venue}/{workshop}/html"),
        &format!("{venue}/papers/{workshop}"),
        path.target_name,
    );
    CvfLayout {
        venue_segment: venue.to_string(),
        workshop: Some(workshop.to_string()),
        abs_url,
        pdf_url,
    }
}

/// `{venue}/html|papers/{workshop}/{name}`
fn trailing_workshop(path: &CvfPath<'_>) -> CvfLayout {
    let venue = path.segment(0);
    let workshop = path.segment(2);
    let (abs_url, pdf_url) = urls(
        &format!("{venue}/html/{workshop}"),
        &format!("{venue}/papers/{workshop}"),
        path.target_name,
    );
    CvfLayout {
        venue_segment: venue.to_string(),
        workshop: Some(workshop.to_string()),
        abs_url,
        pdf_url,
    }
}

/// `content/{venue}/html|papers/{name}`
fn content_main(path: &CvfPath<'_>) -> CvfLayout {
    let venue = path.segment(1);
    let mid = format!("content/{venue}");
    let (abs_url, pdf_url) = urls(&format!("{mid}/html"), &format!("{mid}/papers"), path.target_name);
    CvfLayout {
        venue_segment: venue.to_string(),
        workshop: None,
        abs_url,
        pdf_url,
    }
}

/// `content/{venue}/{workshop}/html|papers/{name}`
fn content_workshop(path: &CvfPath<'_>) -> CvfLayout {
    let venue = path.segment(1);
    let workshop = path.segment(2);
    let mid = format!("content/{venue}/{workshop}");
    let (abs_url, pdf_url) = urls(&format!("{mid}/html"), &format!("{mid}/papers"), path.target_name);
    CvfLayout {
        venue_segment: venue.to_string(),
        workshop: Some(workshop.to_string()),
        abs_url,
        pdf_url,
    }
}

/// Resolver for openaccess.thecvf.com.
#[derive(Debug, Default)]
pub struct CvfResolver;

impl CvfResolver {
    /// Creates a new `CvfResolver`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TargetResolver for CvfResolver {
    fn name(&self) -> &'static str {
        "cvf"
    }

    fn source(&self) -> SourceWebsite {
        SourceWebsite::Cvf
    }

    fn can_handle(&self, target: &str) -> bool {
        target.contains(CVF_HOST)
    }

    #[tracing::instrument(skip(self), fields(resolver = "cvf"))]
    fn resolve(&self, target: &str) -> Result<PaperRecord, ResolveError> {
        let fail = |reason: &str| {
            ResolveError::resolution_failed(target, SourceWebsite::Cvf, &format!("{UNEXPECTED}: {reason}"))
        };

        // Year 0 means "not found"; no rule accepts it.
        let year = YEAR_RE
            .find(target)
            .and_then(|m| m.as_str().parse::<u16>().ok())
            .unwrap_or(0);

        let path = parse_path(target).ok_or_else(|| fail("expected a .html or .pdf paper link"))?;

        let rule = CVF_RULES
            .iter()
            .find(|rule| (rule.applies)(year, path.file_name) && rule.segment_count == path.segments.len())
            .ok_or_else(|| {
                fail(&format!(
                    "no layout for year {year} with {} path segments",
                    path.segments.len()
                ))
            })?;
        tracing::debug!(era = rule.era, year, "Matched CVF layout");

        let layout = (rule.layout)(&path);
        let venue_upper = layout.venue_segment.to_ascii_uppercase();
        let Some(label) = VENUE_LABELS.iter().find(|label| venue_upper.contains(*label)) else {
            return Err(fail(&format!("unknown venue '{}'", layout.venue_segment)));
        };
        let paper_venue = match layout.workshop {
            Some(_) => format!("{label}_Workshops"),
            None => (*label).to_string(),
        };

        let paper_id = paper_slug(path.target_name).ok_or_else(|| fail("paper name too short"))?;

        Ok(PaperRecord::new(paper_id, SourceWebsite::Cvf)
            .with_urls(Some(layout.abs_url), Some(layout.pdf_url))
            .with_venue(year, paper_venue))
    }
}

fn parse_path(target: &str) -> Option<CvfPath<'_>> {
    let segments = segments_after_host(target, CVF_HOST)?;
    let file_name = *segments.last()?;
    let (target_name, is_html) = if let Some(stem) = file_name.strip_suffix(".html") {
        (stem, true)
    } else if let Some(stem) = file_name.strip_suffix(".pdf") {
        (stem, false)
    } else {
        return None;
    };
    Some(CvfPath {
        segments,
        file_name,
        target_name,
        is_html,
    })
}

/// Drops the leading author surname and the trailing `VENUE_YEAR_paper` tokens.
fn paper_slug(target_name: &str) -> Option<String> {
    let tokens: Vec<&str> = target_name.split('_').collect();
    if tokens.len() <= 4 {
        return None;
    }
    Some(tokens[1..tokens.len() - 3].join("_"))
}
