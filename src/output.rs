//! Result types returned by the extraction pipeline.
//!
//! [`ExtractionResult`] is the single record every invocation ends in. It
//! serialises to one of two JSON shapes:
//!
//! ```text
//! success: {success, text, numPages, pagesProcessed, method, info:{…}, metadata:{…}}
//! failure: {success: false, error, details}
//! ```
//!
//! Both outer surfaces (CLI and HTTP) emit exactly this shape so a caller can
//! parse either without knowing where it came from.

use crate::error::SalvageError;
use serde::{Deserialize, Serialize, Serializer};

/// Document-level metadata reported by the winning strategy.
///
/// Fields the backend could not supply are empty strings, never missing, so
/// the serialised shape is stable across strategies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub creator: String,
    pub producer: String,
    pub creation_date: String,
    #[serde(rename = "modDate")]
    pub modification_date: String,
}

/// How one strategy fared during selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Produced non-empty text and won.
    Succeeded,
    /// Ran, but returned only whitespace.
    Empty,
    /// Capability not present in this runtime.
    Unavailable,
    /// Could not open the document or failed mid-way.
    Failed,
}

/// One entry per strategy the selector invoked, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub strategy: String,
    pub outcome: AttemptOutcome,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

/// Provenance of the result: which backend, which file, what repair did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Name of the strategy that produced the text.
    pub method: String,
    /// Original filename, URL basename, or `document.pdf` for anonymous buffers.
    pub filename: String,
    pub file_size_bytes: u64,
    /// Character count of the extracted text before repair.
    pub original_length: usize,
    /// Character count after repair.
    pub cleaned_length: usize,
    pub attempts: Vec<AttemptRecord>,
}

/// The final record of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub success: bool,
    /// Repaired text. Non-empty after trimming whenever `success` is true.
    pub text: String,
    /// True page count of the document.
    pub page_count: usize,
    /// Pages actually read (after the cap and skipped pages).
    pub pages_processed: usize,
    /// Winning strategy name; empty on failure.
    pub method: String,
    pub info: DocumentInfo,
    pub metadata: ResultMetadata,
    pub error: Option<String>,
    pub details: Option<String>,
}

impl ExtractionResult {
    /// Build the failure record for a fatal error.
    pub fn failure(err: &SalvageError) -> Self {
        Self {
            success: false,
            text: String::new(),
            page_count: 0,
            pages_processed: 0,
            method: String::new(),
            info: DocumentInfo::default(),
            metadata: ResultMetadata::default(),
            error: Some(err.to_string()),
            details: Some(err.details()),
        }
    }

    /// Collapse a facade result into a record; callers at the outer surfaces
    /// always get a well-formed body.
    pub fn from_outcome(outcome: Result<ExtractionResult, SalvageError>) -> Self {
        match outcome {
            Ok(result) => result,
            Err(e) => Self::failure(&e),
        }
    }

    /// Size of the source PDF in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.metadata.file_size_bytes
    }
}

/// Document facts reported by `inspect`, without text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub filename: String,
    pub file_size_bytes: u64,
    pub num_pages: usize,
    /// Strategy that could open the document.
    pub method: String,
    pub info: DocumentInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuccessBody<'a> {
    success: bool,
    text: &'a str,
    num_pages: usize,
    pages_processed: usize,
    method: &'a str,
    info: &'a DocumentInfo,
    metadata: &'a ResultMetadata,
}

#[derive(Serialize)]
struct FailureBody<'a> {
    success: bool,
    error: &'a str,
    details: &'a str,
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.success {
            SuccessBody {
                success: true,
                text: &self.text,
                num_pages: self.page_count,
                pages_processed: self.pages_processed,
                method: &self.method,
                info: &self.info,
                metadata: &self.metadata,
            }
            .serialize(serializer)
        } else {
            let error = self.error.as_deref().unwrap_or("unknown error");
            FailureBody {
                success: false,
                error,
                details: self.details.as_deref().unwrap_or(error),
            }
            .serialize(serializer)
        }
    }
}
