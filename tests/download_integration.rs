//! Integration tests for PDF downloads.
//!
//! Streamed downloads run against mock servers; segmented downloads use
//! small shell scripts standing in for `aria2c`.

mod support;

use std::path::Path;

use paperdl_core::download::{Aria2Downloader, SegmentedDownloader};
use paperdl_core::http::HttpSettings;
use paperdl_core::{
    DownloadError, DownloadManager, DownloadOutcome, DownloadStrategy, HttpClient, PaperRecord,
    SourceWebsite,
};
use support::start_mock_server_or_skip;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n";

fn http() -> HttpClient {
    HttpClient::new(&HttpSettings::download_defaults()).unwrap()
}

fn arxiv_record(pdf_url: String) -> PaperRecord {
    let mut record = PaperRecord::new("2103.15538", SourceWebsite::ArXiv)
        .with_urls(Some("https://arxiv.org/abs/2103.15538".into()), Some(pdf_url));
    record.download_name =
        Some("2103.15538_Meta_Compositional_Referring_Expression_Segmentation.pdf".into());
    record
}

fn cvf_record(pdf_url: String) -> PaperRecord {
    PaperRecord::new("Going_Deeper_With", SourceWebsite::Cvf)
        .with_urls(None, Some(pdf_url))
        .with_venue(2015, "CVPR")
}

async fn mount_pdf(server: &MockServer, route: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/pdf")
                .set_body_bytes(PDF_BYTES.to_vec()),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn leftovers(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains(".part"))
        .collect()
}

#[tokio::test]
async fn test_http_client_writes_body_to_path() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_pdf(&server, "/pdf/2103.15538.pdf", 1).await;
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("paper.pdf.part");

    let written = http()
        .download_to_path(&format!("{}/pdf/2103.15538.pdf", server.uri()), &dest)
        .await
        .unwrap();
    assert_eq!(written, PDF_BYTES.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), PDF_BYTES);
}

#[tokio::test]
async fn test_http_client_404_leaves_nothing() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("missing.pdf.part");

    let err = http()
        .download_to_path(&format!("{}/missing.pdf", server.uri()), &dest)
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::HttpStatus { status: 404, .. }));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_streamed_download_is_idempotent() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_pdf(&server, "/pdf/2103.15538.pdf", 1).await;
    let dir = TempDir::new().unwrap();
    let manager = DownloadManager::streamed_only(http());
    let record = arxiv_record(format!("{}/pdf/2103.15538.pdf", server.uri()));

    let first = manager.download(&record, dir.path(), 5).await.unwrap();
    let expected = dir
        .path()
        .join("2103.15538_Meta_Compositional_Referring_Expression_Segmentation.pdf");
    assert_eq!(
        first,
        DownloadOutcome::Downloaded {
            path: expected.clone(),
            strategy: DownloadStrategy::Streamed,
        }
    );
    assert_eq!(std::fs::read(&expected).unwrap(), PDF_BYTES);

    let second = manager.download(&record, dir.path(), 5).await.unwrap();
    assert_eq!(second, DownloadOutcome::Skipped(expected));
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_http_error_leaves_no_files() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/pdf/2103.15538.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let manager = DownloadManager::streamed_only(http());
    let record = arxiv_record(format!("{}/pdf/2103.15538.pdf", server.uri()));

    let err = manager.download(&record, dir.path(), 1).await.unwrap_err();
    assert!(matches!(err, DownloadError::HttpStatus { status: 404, .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_pdf_url_is_reported() {
    let dir = TempDir::new().unwrap();
    let manager = DownloadManager::streamed_only(http());
    let record = PaperRecord::new("00019", SourceWebsite::Ecva)
        .with_urls(Some("https://www.ecva.net/x.php".into()), None)
        .with_venue(2022, "ECCV");

    let err = manager.download(&record, dir.path(), 5).await.unwrap_err();
    assert!(matches!(
        err,
        DownloadError::MissingField {
            field: "pdf_url",
            ..
        }
    ));
}

#[cfg(unix)]
mod segmented {
    use super::*;

    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    /// Writes an `aria2c` stand-in that saves `body` to `-d DIR -o NAME`.
    fn fake_aria2(dir: &Path, body: &str) -> PathBuf {
        let script = dir.join("fake-aria2c");
        let contents = format!(
            "#!/bin/sh\n\
             while [ $# -gt 0 ]; do\n\
               case \"$1\" in\n\
                 -d) out_dir=\"$2\"; shift 2 ;;\n\
                 -o) out_name=\"$2\"; shift 2 ;;\n\
                 -x) echo \"$2\" > \"{marker}\"; shift 2 ;;\n\
                 *) shift ;;\n\
               esac\n\
             done\n\
             printf '%s' '{body}' > \"$out_dir/$out_name\"\n",
            marker = dir.join("connections").display(),
        );
        std::fs::write(&script, contents).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[tokio::test]
    async fn test_segmented_download_uses_requested_connections() {
        let tools = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let aria2 = Aria2Downloader::with_program(fake_aria2(tools.path(), "%PDF-segmented"));
        assert!(aria2.is_available());
        let manager = DownloadManager::with_segmented(http(), Some(Box::new(aria2)));
        let record = arxiv_record("https://arxiv.org/pdf/2103.15538.pdf".into());

        let outcome = manager.download(&record, dest.path(), 8).await.unwrap();
        assert!(matches!(
            outcome,
            DownloadOutcome::Downloaded {
                strategy: DownloadStrategy::Segmented,
                ..
            }
        ));
        assert_eq!(
            std::fs::read_to_string(outcome.path()).unwrap(),
            "%PDF-segmented"
        );
        assert_eq!(
            std::fs::read_to_string(tools.path().join("connections"))
                .unwrap()
                .trim(),
            "8"
        );
        assert!(leftovers(dest.path()).is_empty());
    }

    #[tokio::test]
    async fn test_cvf_always_streams_over_one_connection() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        mount_pdf(&server, "/content_cvpr_2015/papers/paper.pdf", 1).await;
        let tools = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let aria2 = Aria2Downloader::with_program(fake_aria2(tools.path(), "unused"));
        let manager = DownloadManager::with_segmented(http(), Some(Box::new(aria2)));
        let record = cvf_record(format!("{}/content_cvpr_2015/papers/paper.pdf", server.uri()));

        let outcome = manager.download(&record, dest.path(), 16).await.unwrap();
        assert_eq!(
            outcome,
            DownloadOutcome::Downloaded {
                path: dest.path().join("2015_CVPR_Going_Deeper_With.pdf"),
                strategy: DownloadStrategy::Streamed,
            }
        );
        assert!(!tools.path().join("connections").exists());
    }

    #[tokio::test]
    async fn test_single_connection_skips_segmented_tool() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        mount_pdf(&server, "/pdf/2103.15538.pdf", 1).await;
        let tools = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let aria2 = Aria2Downloader::with_program(fake_aria2(tools.path(), "unused"));
        let manager = DownloadManager::with_segmented(http(), Some(Box::new(aria2)));
        let record = arxiv_record(format!("{}/pdf/2103.15538.pdf", server.uri()));

        let outcome = manager.download(&record, dest.path(), 1).await.unwrap();
        assert_eq!(std::fs::read(outcome.path()).unwrap(), PDF_BYTES);
        assert!(!tools.path().join("connections").exists());
    }

    #[tokio::test]
    async fn test_failing_tool_reports_exit_code_and_cleans_up() {
        let dest = TempDir::new().unwrap();
        let aria2 = Aria2Downloader::with_program("false");
        if !aria2.is_available() {
            eprintln!("`false` not found on PATH; skipping");
            return;
        }
        let manager = DownloadManager::with_segmented(http(), Some(Box::new(aria2)));
        let record = arxiv_record("https://arxiv.org/pdf/2103.15538.pdf".into());

        let err = manager.download(&record, dest.path(), 4).await.unwrap_err();
        assert!(matches!(
            err,
            DownloadError::ExternalTool { code: Some(1), .. }
        ));
        assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 0);
    }
}
