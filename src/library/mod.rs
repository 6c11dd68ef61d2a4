//! On-disk library next to the downloaded PDFs.
//!
//! - [`PaperIndex`] - `000_Paper_List.json`, one entry per paper id
//! - [`write_note`] - a Markdown reading-notes file per paper
//! - [`embed_metadata`] - title/author/abstract written into the PDF itself

mod index;
mod notes;
mod pdf_meta;

pub use index::{INDEX_FILE_NAME, PaperIndex};
pub use notes::{note_file_name, render_note, write_note};
pub use pdf_meta::embed_metadata;

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the index, note and PDF metadata writers.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Reading or writing a library file failed.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The paper index is not a JSON object, or a record failed to serialize.
    #[error("invalid paper index {path}: {source}\n  Suggestion: Fix or move the file aside; a new index will be created")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The PDF could not be parsed or rewritten.
    #[error("cannot update PDF metadata in {path}: {source}")]
    Pdf {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
}

impl LibraryError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a JSON error.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
