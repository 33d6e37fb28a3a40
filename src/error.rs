//! Error types for the pdfsalvage library.
//!
//! Four error types, one per layer, each absorbed at a different level:
//!
//! * [`SalvageError`] (fatal): the invocation cannot produce a result
//!   (file missing, download failed, not a PDF, every strategy failed).
//!   Returned as `Err(SalvageError)` from the top-level `extract*` functions
//!   and turned into a `{success: false, …}` body at the outer surfaces.
//!
//! * [`ExtractionError`] (strategy-local): one backend could not open the
//!   document or is not available in this runtime. The selector logs it and
//!   moves on to the next strategy.
//!
//! * [`PageError`] (page-local): a single page failed to decode. The
//!   strategy logs it, skips the page and keeps going.
//!
//! * [`RepairError`] (cosmetic): a repair pass failed. The repair engine
//!   falls back to the unrepaired text; callers never see it.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfsalvage library.
#[derive(Debug, Error)]
pub enum SalvageError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a usable file path or URL.
    #[error("Invalid input '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The bytes were read, but they are not a PDF.
    #[error("Input '{name}' is not a PDF (first bytes: {magic:?})")]
    NotAPdf { name: String, magic: Vec<u8> },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Every configured strategy failed or produced only whitespace.
    #[error("No text could be extracted from PDF ({} strategies tried)", .attempts.len())]
    AllStrategiesFailed { attempts: Vec<AttemptFailure> },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SalvageError {
    /// Whether the error was caused by the caller's input rather than by us.
    ///
    /// The HTTP surface maps `true` to 400 and `false` to 500.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SalvageError::FileNotFound { .. }
                | SalvageError::InvalidInput { .. }
                | SalvageError::DownloadFailed { .. }
                | SalvageError::DownloadTimeout { .. }
                | SalvageError::NotAPdf { .. }
                | SalvageError::AllStrategiesFailed { .. }
        )
    }

    /// Multi-line diagnostic detail for the `details` field of failure bodies.
    pub fn details(&self) -> String {
        match self {
            SalvageError::AllStrategiesFailed { attempts } if !attempts.is_empty() => attempts
                .iter()
                .map(|a| format!("{}: {}", a.strategy, a.reason))
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}

/// Why a single strategy did not win. Collected into
/// [`SalvageError::AllStrategiesFailed`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttemptFailure {
    pub strategy: String,
    pub reason: String,
}

/// A strategy-level failure. Recoverable: the selector tries the next strategy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// The backing capability is not present in this runtime
    /// (native library missing, feature compiled out).
    #[error("{strategy}: capability unavailable: {reason}")]
    CapabilityUnavailable { strategy: String, reason: String },

    /// The source could not be parsed as a PDF by this backend.
    #[error("{strategy}: could not open document: {detail}")]
    OpenError { strategy: String, detail: String },

    /// Any other backend failure after the document was opened.
    #[error("{strategy}: extraction failed: {detail}")]
    Failed { strategy: String, detail: String },
}

impl ExtractionError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ExtractionError::CapabilityUnavailable { .. })
    }
}

/// A non-fatal error for a single page.
///
/// Recorded in [`crate::strategy::RawExtraction::skipped_pages`]; the page is
/// left out of the text and the extraction continues.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page text could not be decoded.
    #[error("Page {page}: decode failed: {detail}")]
    DecodeFailed { page: usize, detail: String },
}

/// A repair pass failed. Never escapes [`crate::pipeline::repair::TextRepairer`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepairError {
    #[error("repair pass '{pass}' failed: {detail}")]
    PassFailed { pass: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_failed_display_counts_attempts() {
        let e = SalvageError::AllStrategiesFailed {
            attempts: vec![
                AttemptFailure {
                    strategy: "pdfium".into(),
                    reason: "capability unavailable".into(),
                },
                AttemptFailure {
                    strategy: "lopdf".into(),
                    reason: "empty result".into(),
                },
            ],
        };
        let msg = e.to_string();
        assert!(msg.contains("No text could be extracted"), "got: {msg}");
        assert!(msg.contains("2 strategies"), "got: {msg}");
        assert_eq!(
            e.details(),
            "pdfium: capability unavailable; lopdf: empty result"
        );
    }

    #[test]
    fn client_errors_are_classified() {
        assert!(SalvageError::NotAPdf {
            name: "x".into(),
            magic: b"PK\x03\x04".to_vec()
        }
        .is_client_error());
        assert!(SalvageError::DownloadTimeout {
            url: "https://example.org/a.pdf".into(),
            secs: 30
        }
        .is_client_error());
        assert!(!SalvageError::Internal("boom".into()).is_client_error());
        assert!(!SalvageError::InvalidConfig("bad".into()).is_client_error());
    }

    #[test]
    fn extraction_error_display_names_strategy() {
        let e = ExtractionError::OpenError {
            strategy: "lopdf".into(),
            detail: "invalid file header".into(),
        };
        assert!(e.to_string().starts_with("lopdf:"));
        assert!(!e.is_unavailable());
        assert!(ExtractionError::CapabilityUnavailable {
            strategy: "pdfium".into(),
            reason: "no libpdfium".into()
        }
        .is_unavailable());
    }

    #[test]
    fn page_error_display() {
        let e = PageError::DecodeFailed {
            page: 2,
            detail: "bad stream".into(),
        };
        assert_eq!(e.to_string(), "Page 2: decode failed: bad stream");
    }
}
