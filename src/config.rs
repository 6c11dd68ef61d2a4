//! File configuration and download directory resolution.
//!
//! `config.toml` supplies defaults; CLI flags and `ARXIV_DOWNLOAD_FOLDER`
//! override it where noted.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::download::MAX_PARALLELISM;
use crate::http::HttpSettings;

/// Environment variable naming the download directory.
pub const DOWNLOAD_DIR_ENV: &str = "ARXIV_DOWNLOAD_FOLDER";

const APP_DIR: &str = "paperdl";
const CONFIG_FILE: &str = "config.toml";

/// TOML-backed file configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Default download directory.
    pub download_dir: Option<PathBuf>,
    /// Default download connections (1..=16).
    pub parallel_connections: Option<usize>,
    /// Skip note files by default.
    pub pdf_only: Option<bool>,
    /// Embed metadata into PDFs by default.
    pub embed_metadata: Option<bool>,
    pub scrape_connect_timeout_secs: Option<u64>,
    pub scrape_read_timeout_secs: Option<u64>,
    pub download_connect_timeout_secs: Option<u64>,
    pub download_read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error for syntax errors, unknown keys or out-of-range values.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("Invalid config syntax")?;
        config.validate()?;
        Ok(config)
    }

    /// Validates config values against runtime and CLI constraints.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first out-of-range key.
    pub fn validate(&self) -> Result<()> {
        if let Some(parallel) = self.parallel_connections
            && !(1..=MAX_PARALLELISM).contains(&parallel)
        {
            bail!(
                "Invalid config value for `parallel_connections`: {parallel}. Expected range: 1..={MAX_PARALLELISM}"
            );
        }
        if let Some(dir) = &self.download_dir
            && dir.as_os_str().is_empty()
        {
            bail!("Invalid config value for `download_dir`: must not be empty");
        }
        validate_timeout_secs("scrape_connect_timeout_secs", self.scrape_connect_timeout_secs)?;
        validate_timeout_secs("scrape_read_timeout_secs", self.scrape_read_timeout_secs)?;
        validate_timeout_secs(
            "download_connect_timeout_secs",
            self.download_connect_timeout_secs,
        )?;
        validate_timeout_secs("download_read_timeout_secs", self.download_read_timeout_secs)?;
        Ok(())
    }

    /// Scraping client settings with configured timeouts applied.
    #[must_use]
    pub fn scrape_http_settings(&self) -> HttpSettings {
        let defaults = HttpSettings::scrape_defaults();
        let connect = self
            .scrape_connect_timeout_secs
            .unwrap_or(defaults.connect_timeout_secs);
        let read = self
            .scrape_read_timeout_secs
            .unwrap_or(defaults.read_timeout_secs);
        defaults.with_timeouts(connect, read)
    }

    /// Download client settings with configured timeouts applied.
    #[must_use]
    pub fn download_http_settings(&self) -> HttpSettings {
        let defaults = HttpSettings::download_defaults();
        let connect = self
            .download_connect_timeout_secs
            .unwrap_or(defaults.connect_timeout_secs);
        let read = self
            .download_read_timeout_secs
            .unwrap_or(defaults.read_timeout_secs);
        defaults.with_timeouts(connect, read)
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Config path that was consulted, if any.
    pub path: Option<PathBuf>,
    /// Parsed values; defaults when no file was found.
    pub config: FileConfig,
    /// True when values came from disk.
    pub loaded_from_file: bool,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/paperdl/config.toml`
/// 2. `$HOME/.config/paperdl/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join(APP_DIR).join(CONFIG_FILE));
    }
    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILE),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads configuration.
///
/// An explicit path must exist. The default path is optional.
///
/// # Errors
///
/// Returns an error when the file cannot be read or is invalid.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = load_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config,
            loaded_from_file: true,
        });
    }

    let path = resolve_default_config_path();
    match path.as_deref() {
        Some(path_ref) if path_ref.is_file() => {
            let config = load_file_config(path_ref)?;
            Ok(LoadedConfig {
                path,
                config,
                loaded_from_file: true,
            })
        }
        _ => Ok(LoadedConfig {
            path,
            ..LoadedConfig::default()
        }),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    FileConfig::from_toml_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

/// Picks the download directory.
///
/// Priority:
/// 1. `cli` (`--download-dir`)
/// 2. `$ARXIV_DOWNLOAD_FOLDER`
/// 3. `download_dir` from the config file
/// 4. `$HOME/Downloads/ArXiv_Papers`
///
/// # Errors
///
/// Returns an error when none of the sources is available.
pub fn resolve_download_dir(cli: Option<&Path>, config: &FileConfig) -> Result<PathBuf> {
    download_dir_from(
        cli,
        env_var_non_empty_os(DOWNLOAD_DIR_ENV),
        config,
        env_var_non_empty_os("HOME"),
    )
}

fn download_dir_from(
    cli: Option<&Path>,
    env_dir: Option<OsString>,
    config: &FileConfig,
    home: Option<OsString>,
) -> Result<PathBuf> {
    if let Some(dir) = cli {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env_dir {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = &config.download_dir {
        return Ok(dir.clone());
    }
    let Some(home) = home else {
        bail!(
            "Cannot determine a download directory: pass --download-dir or set {DOWNLOAD_DIR_ENV}"
        );
    };
    Ok(PathBuf::from(home).join("Downloads").join("ArXiv_Papers"))
}
