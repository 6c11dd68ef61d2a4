//! arXiv identifier grammar.
//!
//! Two disjoint forms are recognized:
//!
//! - modern: `YYMM.NNNN[N][vV]`, starting with `0704`. Sequence numbers have
//!   four digits up to `1412` and five digits from `1501` on.
//! - legacy: `archive[.XX]/YYMMNNN[vV]`, covering `9101` through `0703`.
//!
//! Validation is pure string inspection. Every input yields a plain answer and
//! nothing here panics.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::resolver::compile_static_regex;

static MODERN_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"^(\d{2})(\d{2})\.(\d{4,5})(?:v(\d+))?$")
});

static LEGACY_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"^([a-z\-]+(?:\.[A-Z]{2})?)/(\d{2})(\d{2})(\d{3,4})(?:v(\d+))?$")
});

/// First month of the modern numbering scheme (April 2007).
const MODERN_FIRST_YYMM: u16 = 704;
/// Last month using four-digit sequence numbers.
const FOUR_DIGIT_LAST_YYMM: u16 = 1412;
/// Highest two-digit year accepted by the modern grammar.
const MODERN_LAST_YEAR: u8 = 29;

/// Which identifier grammar matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArxivScheme {
    Modern,
    Legacy,
}

/// A syntactically valid arXiv identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArxivId {
    scheme: ArxivScheme,
    archive: Option<String>,
    year: u8,
    month: u8,
    sequence: String,
    version: Option<u32>,
}

impl ArxivId {
    /// Parses `input` under either grammar, returning `None` when it matches neither.
    ///
    /// Surrounding whitespace is not trimmed; callers decide what counts as the id.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        parse_modern(input).or_else(|| parse_legacy(input))
    }

    #[must_use]
    pub fn scheme(&self) -> ArxivScheme {
        self.scheme
    }

    /// Archive name (with subject class) for legacy ids, e.g. `math.GT`.
    #[must_use]
    pub fn archive(&self) -> Option<&str> {
        self.archive.as_deref()
    }

    /// Two-digit year as written in the identifier.
    #[must_use]
    pub fn year(&self) -> u8 {
        self.year
    }

    /// Four-digit calendar year.
    #[must_use]
    pub fn full_year(&self) -> u16 {
        let yy = u16::from(self.year);
        if self.scheme == ArxivScheme::Legacy && yy >= 91 {
            1900 + yy
        } else {
            2000 + yy
        }
    }

    #[must_use]
    pub fn month(&self) -> u8 {
        self.month
    }

    #[must_use]
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    #[must_use]
    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// Canonical identifier with any `vN` suffix removed.
    #[must_use]
    pub fn without_version(&self) -> String {
        match (&self.scheme, &self.archive) {
            (ArxivScheme::Legacy, Some(archive)) => format!(
                "{archive}/{:02}{:02}{}",
                self.year, self.month, self.sequence
            ),
            _ => format!("{:02}{:02}.{}", self.year, self.month, self.sequence),
        }
    }
}

impl fmt::Display for ArxivId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.without_version())?;
        if let Some(version) = self.version {
            write!(f, "v{version}")?;
        }
        Ok(())
    }
}

/// Returns true when `input` is a valid modern or legacy arXiv identifier.
#[must_use]
pub fn valid_arxiv_id(input: &str) -> bool {
    ArxivId::parse(input).is_some()
}

fn parse_modern(input: &str) -> Option<ArxivId> {
    let caps = MODERN_RE.captures(input)?;
    let year: u8 = caps.get(1)?.as_str().parse().ok()?;
    let month: u8 = caps.get(2)?.as_str().parse().ok()?;
    let sequence = caps.get(3)?.as_str();

    if !(1..=12).contains(&month) || year > MODERN_LAST_YEAR {
        return None;
    }
    let yymm = u16::from(year) * 100 + u16::from(month);
    if yymm < MODERN_FIRST_YYMM {
        return None;
    }
    let expected_width = if yymm <= FOUR_DIGIT_LAST_YYMM { 4 } else { 5 };
    if sequence.len() != expected_width {
        return None;
    }

    Some(ArxivId {
        scheme: ArxivScheme::Modern,
        archive: None,
        year,
        month,
        sequence: sequence.to_string(),
        version: parse_version(caps.get(4))?,
    })
}

fn parse_legacy(input: &str) -> Option<ArxivId> {
    let caps = LEGACY_RE.captures(input)?;
    let archive = caps.get(1)?.as_str();
    let year: u8 = caps.get(2)?.as_str().parse().ok()?;
    let month: u8 = caps.get(3)?.as_str().parse().ok()?;
    let sequence = caps.get(4)?.as_str();

    if !(1..=12).contains(&month) {
        return None;
    }
    let in_range = match year {
        91..=99 | 0..=6 => true,
        7 => month <= 3,
        _ => false,
    };
    if !in_range {
        return None;
    }

    Some(ArxivId {
        scheme: ArxivScheme::Legacy,
        archive: Some(archive.to_string()),
        year,
        month,
        sequence: sequence.to_string(),
        version: parse_version(caps.get(5))?,
    })
}

/// `Some(None)` when no version is present, `None` when the digits overflow.
fn parse_version(capture: Option<regex::Match<'_>>) -> Option<Option<u32>> {
    match capture {
        None => Some(None),
        Some(m) => m.as_str().parse().ok().map(Some),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_modern_ids_accepted() {
        assert!(valid_arxiv_id("2103.15538"));
        assert!(valid_arxiv_id("2103.15538v2"));
        assert!(valid_arxiv_id("1412.6980"));
        assert!(valid_arxiv_id("0704.0001"));
        assert!(valid_arxiv_id("1501.00001"));
    }

    #[test]
    fn test_modern_epoch_lower_bound_is_0704() {
        assert!(!valid_arxiv_id("0701.15538"));
        assert!(!valid_arxiv_id("0703.1234"));
        assert!(valid_arxiv_id("0704.1234"));
    }

    #[test]
    fn test_modern_sequence_width_depends_on_epoch() {
        assert!(!valid_arxiv_id("1412.69801"));
        assert!(!valid_arxiv_id("1501.0001"));
        assert!(!valid_arxiv_id("2112.0055"));
    }

    #[test]
    fn test_modern_rejects_bad_month_and_year() {
        assert!(!valid_arxiv_id("2113.15538"));
        assert!(!valid_arxiv_id("2100.15538"));
        assert!(!valid_arxiv_id("3001.15538"));
    }

    #[test]
    fn test_legacy_ids_accepted() {
        assert!(valid_arxiv_id("math.GT/0211159"));
        assert!(valid_arxiv_id("hep-th/9901001"));
        assert!(valid_arxiv_id("cond-mat/0703123v2"));
        assert!(valid_arxiv_id("astro-ph/9101123"));
    }

    #[test]
    fn test_legacy_range_ends_at_0703() {
        assert!(!valid_arxiv_id("hep-th/0704001"));
        assert!(!valid_arxiv_id("hep-th/0811001"));
        assert!(!valid_arxiv_id("hep-th/9013001"));
        assert!(!valid_arxiv_id("hep-th/9001001"));
    }

    #[test]
    fn test_malformed_inputs_rejected_without_panic() {
        for input in ["", " ", "abc", "2103.15538 ", "2103.15538v", "MATH/0211159", "2103-15538"] {
            assert!(!valid_arxiv_id(input), "expected invalid: {input:?}");
        }
        assert!(!valid_arxiv_id("2103.15538v99999999999999999999"));
    }

    #[test]
    fn test_parse_exposes_components() {
        let id = ArxivId::parse("2103.15538v2").unwrap();
        assert_eq!(id.scheme(), ArxivScheme::Modern);
        assert_eq!(id.year(), 21);
        assert_eq!(id.full_year(), 2021);
        assert_eq!(id.month(), 3);
        assert_eq!(id.sequence(), "15538");
        assert_eq!(id.version(), Some(2));
        assert_eq!(id.without_version(), "2103.15538");
        assert_eq!(id.to_string(), "2103.15538v2");
    }

    #[test]
    fn test_parse_legacy_components() {
        let id = ArxivId::parse("math.GT/9811159v1").unwrap();
        assert_eq!(id.scheme(), ArxivScheme::Legacy);
        assert_eq!(id.archive(), Some("math.GT"));
        assert_eq!(id.full_year(), 1998);
        assert_eq!(id.without_version(), "math.GT/9811159");
    }
}
