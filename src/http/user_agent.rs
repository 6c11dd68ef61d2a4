//! Shared User-Agent strings for scraping and download traffic.

const TOOL_NAME: &str = "paperdl";

/// User-Agent sent with PDF downloads.
#[must_use]
pub fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{TOOL_NAME}/{version} (academic-research-tool)")
}

/// User-Agent sent with abstract-page and auxiliary metadata requests.
#[must_use]
pub fn default_scraper_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{TOOL_NAME}/{version} (research-tool; metadata)")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agents_carry_tool_name_and_version() {
        for ua in [default_download_user_agent(), default_scraper_user_agent()] {
            let version = ua
                .strip_prefix("paperdl/")
                .and_then(|s| s.split(' ').next())
                .unwrap();
            assert_eq!(version, env!("CARGO_PKG_VERSION"), "bad UA: {ua}");
        }
    }

    #[test]
    fn test_user_agents_differ_by_purpose() {
        assert!(default_download_user_agent().contains("academic-research-tool"));
        assert!(default_scraper_user_agent().contains("metadata"));
    }
}
