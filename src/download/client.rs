//! HTTP client wrapper for streaming a PDF to disk.

use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::error::DownloadError;
use crate::http::{HttpSettings, build_http_client};

/// HTTP client for single-connection downloads.
///
/// Created once and reused across targets so connections are pooled.
///
/// # Example
///
/// ```no_run
/// use paperdl_core::HttpClient;
/// use paperdl_core::http::HttpSettings;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new(&HttpSettings::download_defaults())?;
/// let bytes = client
///     .download_to_path("https://arxiv.org/pdf/2103.15538.pdf", Path::new("./paper.pdf.part"))
///     .await?;
/// println!("wrote {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client from explicit timeout and User-Agent settings.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the reqwest client cannot be built.
    pub fn new(settings: &HttpSettings) -> Result<Self, DownloadError> {
        let client = build_http_client(settings).map_err(|source| DownloadError::Client { source })?;
        Ok(Self { client })
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Streams `url` into `path`, creating or truncating it.
    ///
    /// On any failure the file at `path` is removed. When the server announces
    /// a `Content-Length`, the number of bytes written must match it.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx)
    /// - Writing to disk fails
    /// - The body is shorter or longer than announced
    #[instrument(skip(self), fields(url = %url, path = %path.display()))]
    pub async fn download_to_path(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        let content_length = response.content_length();

        let mut file = File::create(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        let outcome = match stream_to_file(&mut file, response, url, path).await {
            Ok(written) => match content_length {
                Some(expected) if expected != written => {
                    Err(DownloadError::integrity(path, expected, written))
                }
                _ => Ok(written),
            },
            Err(error) => Err(error),
        };

        drop(file);
        match &outcome {
            Ok(bytes) => info!(bytes, "stream complete"),
            Err(_) => {
                debug!(path = %path.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(path).await;
            }
        }
        outcome
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
