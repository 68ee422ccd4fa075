//! Input acquisition: normalise a user-supplied path or URL to a local file.
//!
//! pdfium needs a file-system path, so URL inputs are downloaded into a
//! `TempDir` whose lifetime is tied to the returned [`PdfSource`] — cleanup
//! happens automatically when the job finishes, panic included. The PDF
//! magic bytes (`%PDF`) are validated before anything touches pdfium so
//! callers get an acquisition error rather than a parser crash.

use crate::error::PdfOcrError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// Hard ceiling on downloaded PDF size. Documents beyond this are almost
/// certainly not OCR targets, and the whole body is buffered in memory.
const MAX_DOWNLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// The acquired input — either a local path or a downloaded temp file.
#[derive(Debug)]
pub enum PdfSource {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; PDF downloaded to a temp directory.
    /// The `TempDir` is kept alive to defer cleanup until the job completes.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl PdfSource {
    /// Path to the PDF file regardless of how it was acquired.
    pub fn path(&self) -> &Path {
        match self {
            PdfSource::Local(p) => p,
            PdfSource::Downloaded { path, .. } => path,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Acquire the input string as a local PDF file.
///
/// URLs are downloaded to a temporary directory; local paths are validated
/// for existence, readability, and PDF magic bytes.
pub async fn acquire(input: &str, timeout_secs: u64) -> Result<PdfSource, PdfOcrError> {
    if is_url(input) {
        download(input, timeout_secs).await
    } else {
        open_local(input)
    }
}

/// Validate a local file path: existence, read permission, magic bytes.
fn open_local(path_str: &str) -> Result<PdfSource, PdfOcrError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(PdfOcrError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(PdfOcrError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PdfOcrError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(PdfOcrError::FileNotFound { path });
        }
    }

    debug!("Acquired local PDF: {}", path.display());
    Ok(PdfSource::Local(path))
}

/// Download a URL into a temporary directory and return the path.
async fn download(url: &str, timeout_secs: u64) -> Result<PdfSource, PdfOcrError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PdfOcrError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            PdfOcrError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            PdfOcrError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(PdfOcrError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    if let Some(len) = response.content_length() {
        if len > MAX_DOWNLOAD_BYTES {
            return Err(PdfOcrError::DownloadFailed {
                url: url.to_string(),
                reason: format!("document too large: {} bytes (limit {})", len, MAX_DOWNLOAD_BYTES),
            });
        }
    }

    let filename = filename_from_url(url);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PdfOcrError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if bytes.len() as u64 > MAX_DOWNLOAD_BYTES {
        return Err(PdfOcrError::DownloadFailed {
            url: url.to_string(),
            reason: format!("document too large: {} bytes (limit {})", bytes.len(), MAX_DOWNLOAD_BYTES),
        });
    }

    let temp_dir = TempDir::new().map_err(|e| PdfOcrError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    // Validate before writing so a bad body never reaches pdfium.
    if bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(PdfOcrError::NotAPdf {
            path: file_path,
            magic,
        });
    }

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| PdfOcrError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(PdfSource::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Derive a filename from the last URL path segment, defaulting when the
/// URL has no useful tail.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}
