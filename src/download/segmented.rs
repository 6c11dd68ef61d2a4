//! Multi-connection downloads delegated to an external program.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::constants::ARIA2_PROGRAM;
use super::error::DownloadError;

/// A downloader that splits one file across several connections.
#[async_trait]
pub trait SegmentedDownloader: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Returns true when the downloader can run on this host.
    fn is_available(&self) -> bool;

    /// Fetches `url` into `dir/file_name` using `connections` connections.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ExternalTool`] when the program cannot be
    /// started or exits unsuccessfully.
    async fn fetch(
        &self,
        url: &str,
        dir: &Path,
        file_name: &str,
        connections: usize,
    ) -> Result<(), DownloadError>;
}

/// `aria2c` runner.
#[derive(Debug, Clone)]
pub struct Aria2Downloader {
    program: PathBuf,
}

impl Aria2Downloader {
    /// Uses the given program instead of `aria2c`.
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns a downloader when `aria2c` is found on `PATH`.
    #[must_use]
    pub fn locate() -> Option<Self> {
        find_on_path(Path::new(ARIA2_PROGRAM)).map(Self::with_program)
    }

    fn args(url: &str, dir: &Path, file_name: &str, connections: usize) -> Vec<OsString> {
        let connections = connections.to_string();
        vec![
            "-x".into(),
            connections.clone().into(),
            "-s".into(),
            connections.into(),
            "-d".into(),
            dir.as_os_str().to_owned(),
            "-o".into(),
            file_name.into(),
            "--allow-overwrite=true".into(),
            "--auto-file-renaming=false".into(),
            url.into(),
        ]
    }
}

#[async_trait]
impl SegmentedDownloader for Aria2Downloader {
    fn name(&self) -> &str {
        ARIA2_PROGRAM
    }

    fn is_available(&self) -> bool {
        find_on_path(&self.program).is_some()
    }

    #[instrument(skip(self), fields(program = %self.program.display()))]
    async fn fetch(
        &self,
        url: &str,
        dir: &Path,
        file_name: &str,
        connections: usize,
    ) -> Result<(), DownloadError> {
        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .args(Self::args(url, dir, file_name, connections))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DownloadError::external_tool(&program, url, None, &e.to_string()))?;

        if output.status.success() {
            debug!("segmented fetch finished");
            return Ok(());
        }

        let mut captured = String::from_utf8_lossy(&output.stderr).into_owned();
        if captured.trim().is_empty() {
            captured = String::from_utf8_lossy(&output.stdout).into_owned();
        }
        Err(DownloadError::external_tool(
            program,
            url,
            output.status.code(),
            &captured,
        ))
    }
}

/// Resolves `program` to an executable file, searching `PATH` for bare names.
fn find_on_path(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
