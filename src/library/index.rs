//! `000_Paper_List.json`: a JSON object keyed by paper id.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::LibraryError;
use crate::record::PaperRecord;

/// File name of the index inside the download directory.
pub const INDEX_FILE_NAME: &str = "000_Paper_List.json";

const INDENT: &[u8] = b"    ";

/// Additive index of every paper saved to a download directory.
///
/// Entries are never replaced: the first record stored for an id wins.
#[derive(Debug, Clone)]
pub struct PaperIndex {
    path: PathBuf,
}

impl PaperIndex {
    /// Index stored in `download_dir`.
    #[must_use]
    pub fn in_dir(download_dir: &Path) -> Self {
        Self {
            path: download_dir.join(INDEX_FILE_NAME),
        }
    }

    /// Location of the index file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all entries. A missing or empty file is an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Io`] on read failures and
    /// [`LibraryError::Json`] when the file is not a JSON object.
    pub async fn load(&self) -> Result<Map<String, Value>, LibraryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(LibraryError::io(&self.path, e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| LibraryError::json(&self.path, e))
    }

    /// Adds `record` unless its id is already present.
    ///
    /// Returns `true` when the index was extended. The file is replaced via a
    /// temporary sibling and a rename.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError`] when the index cannot be read or written.
    #[instrument(skip(self, record), fields(paper_id = %record.paper_id, path = %self.path.display()))]
    pub async fn add(&self, record: &PaperRecord) -> Result<bool, LibraryError> {
        let mut entries = self.load().await?;
        if entries.contains_key(&record.paper_id) {
            debug!("paper already indexed");
            return Ok(false);
        }

        let entry = serde_json::to_value(record).map_err(|e| LibraryError::json(&self.path, e))?;
        entries.insert(record.paper_id.clone(), entry);
        self.store(&entries).await?;
        debug!(entries = entries.len(), "paper indexed");
        Ok(true)
    }

    async fn store(&self, entries: &Map<String, Value>) -> Result<(), LibraryError> {
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
        entries
            .serialize(&mut serializer)
            .map_err(|e| LibraryError::json(&self.path, e))?;
        buffer.push(b'\n');

        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, &buffer)
            .await
            .map_err(|e| LibraryError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| LibraryError::io(&self.path, e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::record::SourceWebsite;
    use tempfile::TempDir;

    fn record(id: &str, title: &str) -> PaperRecord {
        let mut record = PaperRecord::new(id, SourceWebsite::ArXiv);
        record.title = Some(title.to_string());
        record
    }

    #[tokio::test]
    async fn test_add_creates_pretty_index() {
        let dir = TempDir::new().unwrap();
        let index = PaperIndex::in_dir(dir.path());

        assert!(index.add(&record("2103.15538", "First")).await.unwrap());

        let text = std::fs::read_to_string(dir.path().join(INDEX_FILE_NAME)).unwrap();
        assert!(text.starts_with("{\n    \"2103.15538\": {\n        "));
        let entries = index.load().await.unwrap();
        assert_eq!(entries["2103.15538"]["title"], "First");
        assert_eq!(entries["2103.15538"]["src_website"], "ArXiv");
    }

    #[tokio::test]
    async fn test_add_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let index = PaperIndex::in_dir(dir.path());

        assert!(index.add(&record("2103.15538", "First")).await.unwrap());
        assert!(!index.add(&record("2103.15538", "Second")).await.unwrap());
        assert!(index.add(&record("1901.01234", "Other")).await.unwrap());

        let entries = index.load().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["2103.15538"]["title"], "First");
    }

    #[tokio::test]
    async fn test_existing_foreign_entries_are_kept() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(INDEX_FILE_NAME),
            r#"{"legacy": {"title": "kept as-is", "extra": 1}}"#,
        )
        .unwrap();
        let index = PaperIndex::in_dir(dir.path());

        index.add(&record("2103.15538", "New")).await.unwrap();
        let entries = index.load().await.unwrap();
        assert_eq!(entries["legacy"]["extra"], 1);
        assert!(!dir.path().join("000_Paper_List.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_non_object_index_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(INDEX_FILE_NAME), "[1, 2]").unwrap();
        let err = PaperIndex::in_dir(dir.path()).load().await.unwrap_err();
        assert!(matches!(err, LibraryError::Json { .. }));
    }

    #[tokio::test]
    async fn test_empty_file_is_empty_index() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(INDEX_FILE_NAME), "  \n").unwrap();
        assert!(PaperIndex::in_dir(dir.path()).load().await.unwrap().is_empty());
    }
}
