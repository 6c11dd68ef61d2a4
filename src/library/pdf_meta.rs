//! Writes scraped metadata into the PDF `Info` dictionary.

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, StringFormat};
use tracing::{debug, instrument};

use super::LibraryError;
use crate::record::PaperRecord;

/// Sets `Title`, `Author`, `Subject` and `Keywords` on the PDF at `path`.
///
/// Fields the record lacks are left as they are. The updated document is
/// saved to a `.tmp` sibling and renamed over the original, so a failed save
/// leaves the downloaded PDF untouched.
///
/// # Errors
///
/// Returns [`LibraryError::Pdf`] when the file cannot be parsed or its
/// `Info` dictionary cannot be updated, and [`LibraryError::Io`] when saving
/// fails.
#[instrument(skip(record), fields(paper_id = %record.paper_id, path = %path.display()))]
pub fn embed_metadata(path: &Path, record: &PaperRecord) -> Result<(), LibraryError> {
    let pdf_error = |source| LibraryError::Pdf {
        path: path.to_path_buf(),
        source,
    };

    let mut document = Document::load(path).map_err(pdf_error)?;
    let info_id = match document
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
    {
        Ok(id) => id,
        Err(_) => {
            let id = document.add_object(Dictionary::new());
            document.trailer.set("Info", Object::Reference(id));
            id
        }
    };

    let info = document
        .get_object_mut(info_id)
        .and_then(Object::as_dict_mut)
        .map_err(pdf_error)?;

    if let Some(title) = record.title.as_deref() {
        info.set("Title", pdf_text(title));
    }
    if !record.authors.is_empty() {
        info.set("Author", pdf_text(&record.authors.join(", ")));
    }
    if let Some(abstract_text) = record.abstract_text.as_deref() {
        info.set("Subject", pdf_text(abstract_text));
    }
    if let Some(keywords) = keywords(record) {
        info.set("Keywords", pdf_text(&keywords));
    }

    let tmp = temp_sibling(path);
    if let Err(e) = document.save(&tmp) {
        let _ = std::fs::remove_file(&tmp);
        return Err(LibraryError::io(&tmp, std::io::Error::other(e)));
    }
    std::fs::rename(&tmp, path).map_err(|e| LibraryError::io(path, e))?;
    debug!("PDF metadata embedded");
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// `CVPR 2021`, or just the venue or year when only one is known.
fn keywords(record: &PaperRecord) -> Option<String> {
    let venue = record.paper_venue.as_deref().map(|v| v.replace('_', " "));
    match (venue, record.year) {
        (Some(venue), Some(year)) => Some(format!("{venue} {year}")),
        (Some(venue), None) => Some(venue),
        (None, Some(year)) => Some(year.to_string()),
        (None, None) => None,
    }
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn pdf_text(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}
