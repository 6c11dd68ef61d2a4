//! Shared helpers for resolver modules: static regexes and URL path splitting.

use regex::Regex;

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Drops any `?query` and `#fragment` from a URL-ish string.
#[must_use]
pub fn strip_query_and_fragment(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}

/// Returns the path segments that follow `host` in `target`.
///
/// `host` is matched as a substring, so scheme and `www.` prefixes are
/// irrelevant. Returns `None` when the host does not occur.
#[must_use]
pub fn segments_after_host<'a>(target: &'a str, host: &str) -> Option<Vec<&'a str>> {
    let target = strip_query_and_fragment(target.trim());
    let idx = target.find(host)?;
    let rest = &target[idx + host.len()..];
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    Some(rest.split('/').collect())
}
