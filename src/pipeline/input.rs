//! Input resolution: normalise a user-supplied path, URL or buffer to a
//! [`PdfSource`].
//!
//! ## Why download to a temp file?
//!
//! Every backend can open a file path, and pdfium reads lazily from one
//! instead of holding a second copy of the document in memory. Downloading to
//! a `TempDir` gives all backends a path while ensuring cleanup happens when
//! the `PdfSource` is dropped, on every exit path. The PDF magic bytes
//! (`%PDF`) are checked before returning so callers get a meaningful error
//! rather than three identical backend failures.

use crate::error::SalvageError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// Name reported for in-memory buffers without a filename.
pub const DEFAULT_FILENAME: &str = "document.pdf";

/// Largest document accepted from a URL: 50 MiB.
pub const MAX_DOWNLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// The PDF an invocation works on. Immutable once resolved; owned by exactly
/// one invocation and released when dropped.
#[derive(Debug)]
pub enum PdfSource {
    /// Bytes already in memory (upload body, database blob, test fixture).
    Memory { bytes: Vec<u8>, filename: String },
    /// A file on the local file system.
    Local(PathBuf),
    /// Input was a URL; PDF downloaded to a temp directory.
    /// The `TempDir` is kept alive to prevent cleanup until the invocation ends.
    Downloaded {
        path: PathBuf,
        url: String,
        _temp_dir: TempDir,
    },
}

/// Borrowed view of the underlying data, for backends that can open either.
#[derive(Debug, Clone, Copy)]
pub enum SourceView<'a> {
    Bytes(&'a [u8]),
    File(&'a Path),
}

impl PdfSource {
    /// Wrap an in-memory buffer, validating the PDF magic bytes.
    pub fn from_bytes(bytes: Vec<u8>, filename: impl Into<String>) -> Result<Self, SalvageError> {
        let filename = filename.into();
        let filename = if filename.trim().is_empty() {
            DEFAULT_FILENAME.to_string()
        } else {
            filename
        };
        check_magic(&bytes, &filename)?;
        Ok(PdfSource::Memory { bytes, filename })
    }

    pub fn view(&self) -> SourceView<'_> {
        match self {
            PdfSource::Memory { bytes, .. } => SourceView::Bytes(bytes),
            PdfSource::Local(path) => SourceView::File(path),
            PdfSource::Downloaded { path, .. } => SourceView::File(path),
        }
    }

    /// File name reported in result metadata.
    pub fn filename(&self) -> String {
        match self {
            PdfSource::Memory { filename, .. } => filename.clone(),
            PdfSource::Local(path) | PdfSource::Downloaded { path, .. } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
        }
    }

    /// Size of the PDF in bytes (0 if the file vanished underneath us).
    pub fn size_bytes(&self) -> u64 {
        match self {
            PdfSource::Memory { bytes, .. } => bytes.len() as u64,
            PdfSource::Local(path) | PdfSource::Downloaded { path, .. } => {
                std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
            }
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a [`PdfSource`].
///
/// If the input is a URL, download it to a temporary directory.
/// If the input is a local file, validate it exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<PdfSource, SalvageError> {
    if input.trim().is_empty() {
        return Err(SalvageError::InvalidInput {
            input: input.to_string(),
            reason: "empty path or URL".into(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Resolve a local file path, validating existence and PDF magic bytes.
pub fn resolve_local(path_str: &str) -> Result<PdfSource, SalvageError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(SalvageError::FileNotFound { path });
    }
    if path.is_dir() {
        return Err(SalvageError::InvalidInput {
            input: path_str.to_string(),
            reason: "is a directory".into(),
        });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            let read = f.read(&mut magic).unwrap_or(0);
            check_magic(&magic[..read], path_str)?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(SalvageError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(SalvageError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(PdfSource::Local(path))
}

/// Download a URL to a temporary directory and return the source.
///
/// Network failures are reported as `DownloadFailed`/`DownloadTimeout`, never
/// as extraction errors.
async fn download_url(url: &str, timeout_secs: u64) -> Result<PdfSource, SalvageError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SalvageError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_send_err = |e: reqwest::Error| {
        if e.is_timeout() {
            SalvageError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            SalvageError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let mut response = client.get(url).send().await.map_err(map_send_err)?;

    if !response.status().is_success() {
        return Err(SalvageError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = filename_from_url(url);
    if let Some(declared) = response.content_length() {
        check_download_size(url, declared)?;
    }
    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(map_send_err)? {
        check_download_size(url, (bytes.len() + chunk.len()) as u64)?;
        bytes.extend_from_slice(&chunk);
    }

    check_magic(&bytes, url)?;

    let temp_dir = TempDir::new().map_err(|e| SalvageError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| SalvageError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(PdfSource::Downloaded {
        path: file_path,
        url: url.to_string(),
        _temp_dir: temp_dir,
    })
}

/// Extract a reasonable filename from the URL path.
pub fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    DEFAULT_FILENAME.to_string()
}

fn check_download_size(url: &str, size: u64) -> Result<(), SalvageError> {
    if size > MAX_DOWNLOAD_BYTES {
        return Err(SalvageError::DownloadFailed {
            url: url.to_string(),
            reason: format!("response exceeds {} bytes", MAX_DOWNLOAD_BYTES),
        });
    }
    Ok(())
}

fn check_magic(bytes: &[u8], name: &str) -> Result<(), SalvageError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(SalvageError::NotAPdf {
            name: name.to_string(),
            magic: bytes.iter().take(4).copied().collect(),
        });
    }
    Ok(())
}
