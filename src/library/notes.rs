//! Markdown reading-notes files.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use super::LibraryError;
use crate::record::{PaperRecord, SourceWebsite, filesystem_safe_id};

/// `{id}__Notes.md`, with path separators in the id replaced.
#[must_use]
pub fn note_file_name(paper_id: &str) -> String {
    format!("{}__Notes.md", filesystem_safe_id(paper_id))
}

/// Renders the note body for `record`.
#[must_use]
pub fn render_note(record: &PaperRecord) -> String {
    let mut note = String::new();
    let title = record.title.as_deref().unwrap_or(&record.paper_id);
    let _ = writeln!(note, "# {title}\n");

    let mut links = Vec::new();
    if let Some(abs_url) = &record.abs_url {
        links.push(format!("[{}]({abs_url})", page_label(record.src_website)));
    }
    if let Some(pdf_url) = &record.pdf_url {
        links.push(format!("[PDF]({pdf_url})"));
    }
    if !links.is_empty() {
        let _ = writeln!(note, "{}\n", links.join(", "));
    }

    let _ = writeln!(note, "## Authors\n");
    for author in &record.authors {
        let _ = writeln!(note, "- {author}");
    }

    let _ = writeln!(
        note,
        "\n## Abstract\n\n{}\n",
        record.abstract_text.as_deref().unwrap_or_default()
    );
    let _ = writeln!(
        note,
        "## Comments\n\n{}\n",
        record.comments.as_deref().unwrap_or_default()
    );

    let _ = writeln!(note, "## Source Code\n\nOfficial Code\n");
    for url in &record.official_code_urls {
        let _ = writeln!(note, "- [{url}]({url})");
    }
    let _ = writeln!(note, "\nCommunity Code\n");
    if let Some(url) = &record.pwc_page_url {
        let _ = writeln!(note, "- [{url}]({url})");
    }

    let _ = writeln!(
        note,
        "\n## Bibtex\n\n```tex\n{}\n```\n",
        record.bibtex.as_deref().unwrap_or_default()
    );
    let _ = writeln!(note, "## Notes\n\nType your reading notes here...");
    note
}

fn page_label(source: SourceWebsite) -> &'static str {
    match source {
        SourceWebsite::ArXiv => "arXiv",
        other => other.as_str(),
    }
}

/// Writes the note for `record` into `download_dir` unless one exists.
///
/// Returns the note path and whether it was created.
///
/// # Errors
///
/// Returns [`LibraryError::Io`] when the file cannot be created or written.
#[instrument(skip(record), fields(paper_id = %record.paper_id))]
pub async fn write_note(
    record: &PaperRecord,
    download_dir: &Path,
) -> Result<(PathBuf, bool), LibraryError> {
    let path = download_dir.join(note_file_name(&record.paper_id));
    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "note exists, leaving it untouched");
            return Ok((path, false));
        }
        Err(e) => return Err(LibraryError::io(&path, e)),
    };

    file.write_all(render_note(record).as_bytes())
        .await
        .map_err(|e| LibraryError::io(&path, e))?;
    file.flush().await.map_err(|e| LibraryError::io(&path, e))?;
    debug!(path = %path.display(), "note created");
    Ok((path, true))
}
