//! Shared HTTP client construction.
//!
//! Scraping and downloading use separate clients with different timeout
//! budgets, but both are built through [`build_http_client`] so proxy handling
//! and headers stay consistent.

pub mod user_agent;

use std::panic::{AssertUnwindSafe, catch_unwind, set_hook, take_hook};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

/// Default connect timeout for abstract pages and auxiliary lookups.
pub const SCRAPE_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default total request timeout for abstract pages and auxiliary lookups.
pub const SCRAPE_READ_TIMEOUT_SECS: u64 = 30;
/// Default connect timeout for PDF downloads.
pub const DOWNLOAD_CONNECT_TIMEOUT_SECS: u64 = 30;
/// Default read timeout for PDF downloads (large files).
pub const DOWNLOAD_READ_TIMEOUT_SECS: u64 = 300;

/// Timeout and identification policy for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub user_agent: String,
}

impl HttpSettings {
    /// Settings for abstract-page scraping.
    #[must_use]
    pub fn scrape_defaults() -> Self {
        Self {
            connect_timeout_secs: SCRAPE_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: SCRAPE_READ_TIMEOUT_SECS,
            user_agent: user_agent::default_scraper_user_agent(),
        }
    }

    /// Settings for PDF downloads.
    #[must_use]
    pub fn download_defaults() -> Self {
        Self {
            connect_timeout_secs: DOWNLOAD_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DOWNLOAD_READ_TIMEOUT_SECS,
            user_agent: user_agent::default_download_user_agent(),
        }
    }

    /// Returns a copy with the given timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        self.connect_timeout_secs = connect_timeout_secs;
        self.read_timeout_secs = read_timeout_secs;
        self
    }
}

/// Builds a reqwest client from `settings`.
///
/// Some platforms panic inside reqwest while reading system proxy settings.
/// That panic is caught and the build is retried with proxies taken from the
/// `HTTPS_PROXY`/`HTTP_PROXY`/`ALL_PROXY` environment variables only.
///
/// # Errors
///
/// Returns the reqwest builder error when the client cannot be constructed.
///
/// # Panics
///
/// Panics if the env-proxy fallback build panics as well.
pub fn build_http_client(settings: &HttpSettings) -> Result<Client, reqwest::Error> {
    match try_build_client(settings, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            warn!(
                "HTTP client builder panicked while loading system proxy settings; retrying with env-proxy fallback"
            );
            match try_build_client(settings, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Build(error)) => Err(error),
                Err(BuildClientFailure::Panic) => {
                    panic!("HTTP client builder panicked while applying env-proxy fallback")
                }
            }
        }
        Err(BuildClientFailure::Build(error)) => Err(error),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

// catch_unwind does not silence the panic hook; the hook is swapped out while
// a guarded build runs so the expected recovery path stays quiet on stderr.
static CLIENT_BUILD_PANIC_HOOK_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

fn try_build_client(
    settings: &HttpSettings,
    env_proxy_only: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind_silent(AssertUnwindSafe(move || {
        let mut builder = base_client_builder(settings);
        if env_proxy_only {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn catch_unwind_silent<F, T>(operation: F) -> Result<T, Box<dyn std::any::Any + Send + 'static>>
where
    F: FnOnce() -> T + std::panic::UnwindSafe,
{
    let _guard = CLIENT_BUILD_PANIC_HOOK_LOCK
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let previous_hook = take_hook();
    set_hook(Box::new(|_| {}));
    let outcome = catch_unwind(operation);
    set_hook(previous_hook);
    outcome
}

fn base_client_builder(settings: &HttpSettings) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .timeout(Duration::from_secs(settings.read_timeout_secs))
        .gzip(true)
        .user_agent(settings.user_agent.clone())
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => first_set_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        "http" => first_set_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn first_set_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
